use reqwest::{Client, StatusCode};
use tracing::debug;

use super::error::HhError;
use super::types::{AreaSuggestions, VacanciesPage};
use crate::criteria::SearchQuery;

/// Anything that can answer the two job-search queries the bot needs.
///
/// Implemented by [`HhClient`] for the real API and by in-memory mocks in tests.
pub trait VacancySource {
    /// `GET /suggests/areas?text=...`
    async fn suggest_areas(&self, text: &str) -> Result<AreaSuggestions, HhError>;

    /// `GET /vacancies` for one page of `per_page` results.
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<VacanciesPage, HhError>;
}

pub struct HhClient {
    client: Client,
    base_url: String,
}

impl HhClient {
    /// Create a client for the API at `base_url`, e.g. `https://api.hh.ru`.
    pub fn with_base_url(user_agent: &str, base_url: String) -> Result<Self, HhError> {
        // hh.ru rejects requests without a User-Agent.
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, HhError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?params, "hh request");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(HhError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl VacancySource for HhClient {
    async fn suggest_areas(&self, text: &str) -> Result<AreaSuggestions, HhError> {
        self.get_json("/suggests/areas", &[("text", text.to_string())])
            .await
    }

    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<VacanciesPage, HhError> {
        let params = [
            ("text", query.text.clone()),
            ("salary", query.salary.to_string()),
            ("experience", query.experience.to_string()),
            ("area", query.area.clone()),
            ("schedule", query.schedule.to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        let body: VacanciesPage = self.get_json("/vacancies", &params).await?;
        debug!(
            found = body.found,
            pages = body.pages,
            page = body.page,
            items = body.items.len(),
            "hh search response"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query() -> SearchQuery {
        SearchQuery {
            text: "Python developer".into(),
            salary: 50000,
            experience: "noExperience",
            area: "1".into(),
            schedule: "remote",
        }
    }

    #[tokio::test]
    async fn search_sends_all_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vacancies"))
            .and(query_param("text", "Python developer"))
            .and(query_param("salary", "50000"))
            .and(query_param("experience", "noExperience"))
            .and(query_param("area", "1"))
            .and(query_param("schedule", "remote"))
            .and(query_param("per_page", "5"))
            .and(query_param("page", "2"))
            .and(header("user-agent", "vacancy-bot-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "7", "name": "Junior Python"}],
                "found": 11,
                "pages": 3,
                "page": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HhClient::with_base_url("vacancy-bot-test/1.0", server.uri()).unwrap();
        let page = client.search(&query(), 2, 5).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Junior Python");
        assert_eq!(page.found, 11);
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vacancies"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad_argument: area"))
            .mount(&server)
            .await;

        let client = HhClient::with_base_url("test", server.uri()).unwrap();
        let err = client.search(&query(), 0, 5).await.unwrap_err();
        match err {
            HhError::ApiError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad_argument: area");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn suggest_areas_passes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/suggests/areas"))
            .and(query_param("text", "Москва"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "1", "text": "Москва"}, {"id": "2019", "text": "Московская область"}]
            })))
            .mount(&server)
            .await;

        let client = HhClient::with_base_url("test", format!("{}/", server.uri())).unwrap();
        let areas = client.suggest_areas("Москва").await.unwrap();
        assert_eq!(areas.items.len(), 2);
        assert_eq!(areas.items[0].id, "1");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let client = HhClient::with_base_url("test", "http://127.0.0.1:1".into()).unwrap();
        let err = client.suggest_areas("Москва").await.unwrap_err();
        assert!(matches!(err, HhError::NetworkError(_)));
    }
}
