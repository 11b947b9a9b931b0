mod desc;
mod results;
mod spec;
mod stats;

pub use desc::{CreatedSurvey, PublicSurvey, SurveyDescription, SurveyStatus};
pub use results::ResultsReport;
pub use spec::SurveySpec;
pub use stats::{OptionCounts, QuestionData, QuestionStat, RatingSummary, OTHER_LABEL};
