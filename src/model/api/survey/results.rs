use serde::Serialize;

use crate::model::{
    api::survey::{desc::SurveyDescription, stats::QuestionStat},
    db::{response::Response, survey::Survey},
};

/// Aggregated results of a survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsReport {
    pub survey_info: SurveyDescription,
    /// One entry per question, in survey order.
    pub results: Vec<QuestionStat>,
    /// Number of responses aggregated.
    pub total_respondents: u64,
}

impl ResultsReport {
    /// Aggregate `responses` against the questions of `survey`.
    ///
    /// Responses are taken in the order given. Malformed answers never cause
    /// a failure; each one is discarded or bucketed according to its
    /// question's type.
    pub fn aggregate(survey: Survey, responses: &[Response]) -> Self {
        let results = survey
            .questions
            .iter()
            .map(|question| {
                let question_id = question.id.to_string();
                let answers = responses
                    .iter()
                    .filter_map(|response| response.answer(&question_id))
                    .collect::<Vec<_>>();
                QuestionStat::compute(question, &answers)
            })
            .collect();

        Self {
            survey_info: survey.into(),
            results,
            total_respondents: responses.len() as u64,
        }
    }
}
