use log::info;
use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::TryStreamExt,
    http::Status,
    serde::json::{self, Json},
    Route,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            message::Message,
            survey::{CreatedSurvey, ResultsReport, SurveyDescription, SurveySpec, SurveyStatus},
        },
        db::{response::Response, survey::Survey},
        mongodb::{Coll, Id},
    },
};

use super::{parse_id, payload};

pub fn routes() -> Vec<Route> {
    routes![
        create_survey,
        get_surveys,
        get_results,
        delete_survey,
        toggle_status,
    ]
}

/// Look up a survey, checking that `token` belongs to its owner.
async fn owned_survey(surveys: &Coll<Survey>, survey_id: Id, token: &AuthToken) -> Result<Survey> {
    let survey = surveys
        .find_one(survey_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Survey"))?;
    if !survey.is_owned_by(token.id()) {
        return Err(Error::Forbidden("Access forbidden".to_string()));
    }
    Ok(survey)
}

#[post("/surveys", data = "<spec>", format = "json")]
async fn create_survey(
    token: AuthToken,
    spec: std::result::Result<Json<SurveySpec>, json::Error<'_>>,
    surveys: Coll<Survey>,
) -> Result<(Status, Json<CreatedSurvey>)> {
    let survey = Survey {
        id: Id::new(),
        survey: payload(spec)?.into_survey(token.id())?,
    };
    surveys.insert_one(&survey, None).await?;
    let id = survey.id;
    info!("User {} created survey {id}", token.id());

    Ok((
        Status::Created,
        Json(CreatedSurvey {
            message: "Survey created".to_string(),
            id: id.into(),
        }),
    ))
}

#[get("/surveys")]
async fn get_surveys(token: AuthToken, surveys: Coll<Survey>) -> Result<Json<Vec<SurveyDescription>>> {
    let newest_first = FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .build();
    let owned: Vec<Survey> = surveys
        .find(doc! { "created_by": *token.id() }, newest_first)
        .await?
        .try_collect()
        .await?;
    Ok(Json(owned.into_iter().map(Into::into).collect()))
}

#[get("/surveys/<survey_id>/results")]
async fn get_results(
    token: AuthToken,
    survey_id: &str,
    surveys: Coll<Survey>,
    responses: Coll<Response>,
) -> Result<Json<ResultsReport>> {
    let survey = owned_survey(&surveys, parse_id(survey_id)?, &token).await?;
    let submitted: Vec<Response> = responses
        .find(doc! { "survey_id": *survey.id }, None)
        .await?
        .try_collect()
        .await?;
    Ok(Json(ResultsReport::aggregate(survey, &submitted)))
}

#[delete("/surveys/<survey_id>")]
async fn delete_survey(
    token: AuthToken,
    survey_id: &str,
    surveys: Coll<Survey>,
    responses: Coll<Response>,
) -> Result<Json<Message>> {
    let survey = owned_survey(&surveys, parse_id(survey_id)?, &token).await?;
    surveys.delete_one(survey.id.as_doc(), None).await?;
    let deleted = responses
        .delete_many(doc! { "survey_id": *survey.id }, None)
        .await?
        .deleted_count;
    info!("Deleted survey {} and {deleted} responses", survey.id);
    Ok(Json(Message::new("Survey deleted")))
}

#[patch("/surveys/<survey_id>/status")]
async fn toggle_status(
    token: AuthToken,
    survey_id: &str,
    surveys: Coll<Survey>,
) -> Result<Json<SurveyStatus>> {
    let survey = owned_survey(&surveys, parse_id(survey_id)?, &token).await?;
    let is_active = !survey.is_active;
    surveys
        .update_one(
            survey.id.as_doc(),
            doc! { "$set": { "is_active": is_active } },
            None,
        )
        .await?;
    let message = if is_active { "Survey opened" } else { "Survey closed" };
    Ok(Json(SurveyStatus {
        message: message.to_string(),
        is_active,
    }))
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        http::{ContentType, Header},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json},
    };

    use crate::api::test_support::register_and_login;
    use crate::model::{
        api::user::Registration,
        common::answer::Answer,
        db::{response::NewResponse, user::User},
    };

    use super::*;

    async fn create(client: &Client, auth: &Header<'static>, spec: &SurveySpec) -> Id {
        let response = client
            .post(uri!("/api", create_survey))
            .header(ContentType::JSON)
            .header(auth.clone())
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        let created: CreatedSurvey = response.into_json().await.unwrap();
        *created.id
    }

    async fn owner_id(db: &Database) -> Id {
        Coll::<User>::from_db(db)
            .find_one(doc! { "email": Registration::example().email }, None)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[backend_test(user)]
    async fn create_and_list(client: Client, db: Database, auth: Header<'static>) {
        let first = create(&client, &auth, &SurveySpec::example()).await;
        let mut spec = SurveySpec::example();
        spec.title = "A second survey".to_string();
        let second = create(&client, &auth, &spec).await;

        let stored = Coll::<Survey>::from_db(&db)
            .find_one(first.as_doc(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner_id(&db).await, stored.created_by);
        assert!(stored.is_active);
        assert_eq!(0, stored.response_count);

        let response = client
            .get(uri!("/api", get_surveys))
            .header(auth)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let listed: Vec<SurveyDescription> = response.into_json().await.unwrap();
        let ids = listed.iter().map(|s| *s.id).collect::<Vec<_>>();
        assert_eq!(vec![second, first], ids);
    }

    #[backend_test(user)]
    async fn surveys_are_listed_per_owner(client: Client, auth: Header<'static>) {
        create(&client, &auth, &SurveySpec::example()).await;
        let other = register_and_login(&client, Registration::example2()).await;

        let response = client
            .get(uri!("/api", get_surveys))
            .header(other)
            .dispatch()
            .await;
        let listed: Vec<SurveyDescription> = response.into_json().await.unwrap();
        assert!(listed.is_empty());
    }

    #[backend_test(user)]
    async fn invalid_spec(client: Client, auth: Header<'static>, surveys: Coll<Survey>) {
        let mut spec = SurveySpec::example();
        spec.title = "Hey".to_string();
        let response = client
            .post(uri!("/api", create_survey))
            .header(ContentType::JSON)
            .header(auth)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(0, surveys.count_documents(None, None).await.unwrap());
    }

    #[backend_test]
    async fn token_required(client: Client) {
        let response = client.get(uri!("/api", get_surveys)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(json!({ "error": "Missing token" }), body);

        let response = client
            .get(uri!("/api", get_surveys))
            .header(Header::new("Authorization", "Bearer nonsense"))
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test(user)]
    async fn results(client: Client, auth: Header<'static>, new_responses: Coll<NewResponse>) {
        let survey_id = create(&client, &auth, &SurveySpec::example()).await;
        for answer in ["Yes", "Yes", "Maybe"] {
            let response = Response::example(survey_id, [("1", Answer::Scalar(answer.to_string()))]);
            new_responses.insert_one(response.response, None).await.unwrap();
        }

        let response = client
            .get(format!("/api/surveys/{survey_id}/results"))
            .header(auth)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let report: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(3, report["total_respondents"]);
        assert_eq!(survey_id.to_string(), report["survey_info"]["_id"]);
        assert_eq!(
            json!({ "Yes": 2, "No": 0, "Other": 1 }),
            report["results"][0]["data"]
        );
        assert_eq!(0, report["results"][1]["total_answers"]);
    }

    #[backend_test(user)]
    async fn results_are_owner_only(client: Client, auth: Header<'static>) {
        let survey_id = create(&client, &auth, &SurveySpec::example()).await;
        let other = register_and_login(&client, Registration::example2()).await;

        let response = client
            .get(format!("/api/surveys/{survey_id}/results"))
            .header(other.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        let response = client
            .get(format!("/api/surveys/{}/results", Id::new()))
            .header(other.clone())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .get("/api/surveys/not-an-id/results")
            .header(other)
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test(user)]
    async fn toggle_then_delete(
        client: Client,
        auth: Header<'static>,
        surveys: Coll<Survey>,
        new_responses: Coll<NewResponse>,
    ) {
        let survey_id = create(&client, &auth, &SurveySpec::example()).await;
        let answer = Response::example(survey_id, [("4", Answer::Scalar("Nice".to_string()))]);
        new_responses.insert_one(answer.response, None).await.unwrap();

        for expected in [false, true] {
            let response = client
                .patch(format!("/api/surveys/{survey_id}/status"))
                .header(auth.clone())
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status());
            let status: SurveyStatus = response.into_json().await.unwrap();
            assert_eq!(expected, status.is_active);
            let stored = surveys.find_one(survey_id.as_doc(), None).await.unwrap().unwrap();
            assert_eq!(expected, stored.is_active);
        }

        let other = register_and_login(&client, Registration::example2()).await;
        let response = client
            .delete(format!("/api/surveys/{survey_id}"))
            .header(other)
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        let response = client
            .delete(format!("/api/surveys/{survey_id}"))
            .header(auth)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(0, surveys.count_documents(None, None).await.unwrap());
        assert_eq!(0, new_responses.count_documents(None, None).await.unwrap());
    }
}
