use std::net::IpAddr;

use log::info;
use mongodb::bson::doc;
use rocket::{
    http::Status,
    serde::json::{self, Json},
    Route,
};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::Requester,
        message::Message,
        response::ResponseSubmission,
        survey::PublicSurvey,
    },
    db::{response::NewResponse, survey::Survey},
    mongodb::Coll,
};

use super::{parse_id, payload};

pub fn routes() -> Vec<Route> {
    routes![public_survey, respond]
}

fn closed() -> Error {
    Error::Forbidden("This survey is closed".to_string())
}

#[get("/public/surveys/<survey_id>")]
async fn public_survey(survey_id: &str, surveys: Coll<Survey>) -> Result<Json<PublicSurvey>> {
    let survey = surveys
        .find_one(parse_id(survey_id)?.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Survey"))?;
    if !survey.is_active {
        return Err(closed());
    }
    Ok(Json(survey.into()))
}

#[post("/public/surveys/<survey_id>/respond", data = "<submission>", format = "json")]
async fn respond(
    requester: Requester,
    survey_id: &str,
    submission: std::result::Result<Json<ResponseSubmission>, json::Error<'_>>,
    client_ip: Option<IpAddr>,
    surveys: Coll<Survey>,
    new_responses: Coll<NewResponse>,
) -> Result<(Status, Json<Message>)> {
    let survey_id = parse_id(survey_id)?;
    let response =
        payload(submission)?.into_response(survey_id, client_ip.map(|ip| ip.to_string()))?;

    let survey = surveys
        .find_one(survey_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Survey"))?;
    if let Requester(Some(token)) = requester {
        if survey.is_owned_by(token.id()) {
            return Err(Error::Forbidden(
                "You cannot submit a response to your own survey.".to_string(),
            ));
        }
    }
    if !survey.is_active {
        return Err(closed());
    }

    new_responses.insert_one(&response, None).await?;
    surveys
        .update_one(
            survey_id.as_doc(),
            doc! { "$inc": { "response_count": 1 } },
            None,
        )
        .await?;
    info!("Recorded a response to survey {survey_id}");

    Ok((
        Status::Created,
        Json(Message::new("Response recorded successfully")),
    ))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Header},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json},
    };

    use crate::api::test_support::register_and_login;
    use crate::model::{
        api::user::Registration,
        common::answer::Answer,
        db::{response::Response, user::User},
        mongodb::Id,
    };

    use super::*;

    /// Store an example survey owned by the example user.
    async fn insert_survey(surveys: &Coll<Survey>, users: &Coll<User>, is_active: bool) -> Id {
        let owner = users
            .find_one(doc! { "email": Registration::example().email }, None)
            .await
            .unwrap()
            .unwrap();
        let mut survey = Survey::example(owner.id);
        survey.is_active = is_active;
        surveys.insert_one(&survey, None).await.unwrap();
        survey.id
    }

    async fn submit(client: &Client, survey_id: Id, body: serde_json::Value) -> Status {
        client
            .post(format!("/api/public/surveys/{survey_id}/respond"))
            .header(ContentType::JSON)
            .remote("10.0.0.7:4000".parse().unwrap())
            .body(body.to_string())
            .dispatch()
            .await
            .status()
    }

    #[backend_test(user)]
    async fn view_survey(client: Client, surveys: Coll<Survey>, users: Coll<User>) {
        let survey_id = insert_survey(&surveys, &users, true).await;
        let response = client
            .get(format!("/api/public/surveys/{survey_id}"))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let survey: PublicSurvey = response.into_json().await.unwrap();
        assert_eq!(survey_id, *survey.id);
        assert_eq!(4, survey.questions.len());

        let closed_id = insert_survey(&surveys, &users, false).await;
        let response = client
            .get(format!("/api/public/surveys/{closed_id}"))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        let response = client
            .get(format!("/api/public/surveys/{}", Id::new()))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get("/api/public/surveys/12345").dispatch().await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test(user)]
    async fn anonymous_response(
        client: Client,
        surveys: Coll<Survey>,
        users: Coll<User>,
        responses: Coll<Response>,
    ) {
        let survey_id = insert_survey(&surveys, &users, true).await;
        let body = json!({ "answers": { "1": "Yes", "langs": ["Rust"], "3": 4, "4": null } });
        assert_eq!(Status::Created, submit(&client, survey_id, body).await);

        let stored = responses
            .find_one(doc! { "survey_id": *survey_id }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(3, stored.answers.len());
        assert_eq!(Some(&Answer::Scalar("4".to_string())), stored.answer("3"));
        assert_eq!(Some("10.0.0.7"), stored.source_address.as_deref());

        let survey = surveys.find_one(survey_id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(1, survey.response_count);
    }

    #[backend_test(user)]
    async fn rejected_responses(
        client: Client,
        surveys: Coll<Survey>,
        users: Coll<User>,
        responses: Coll<Response>,
    ) {
        let open = insert_survey(&surveys, &users, true).await;
        let closed = insert_survey(&surveys, &users, false).await;
        let answers = json!({ "answers": { "1": "No" } });

        assert_eq!(Status::Forbidden, submit(&client, closed, answers.clone()).await);
        assert_eq!(Status::NotFound, submit(&client, Id::new(), answers).await);
        assert_eq!(Status::BadRequest, submit(&client, open, json!({ "answers": {} })).await);
        assert_eq!(
            Status::BadRequest,
            submit(&client, open, json!({ "answers": { "1": null } })).await
        );
        assert_eq!(0, responses.count_documents(None, None).await.unwrap());
    }

    #[backend_test(user)]
    async fn creator_cannot_respond(
        client: Client,
        auth: Header<'static>,
        surveys: Coll<Survey>,
        users: Coll<User>,
    ) {
        let survey_id = insert_survey(&surveys, &users, true).await;
        let uri = format!("/api/public/surveys/{survey_id}/respond");
        let body = json!({ "answers": { "4": "Looks great" } }).to_string();

        let response = client
            .post(uri.clone())
            .header(ContentType::JSON)
            .header(auth)
            .body(body.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        // Other users may respond.
        let other = register_and_login(&client, Registration::example2()).await;
        let response = client
            .post(uri)
            .header(ContentType::JSON)
            .header(other)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
    }
}
