use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use slotbook_api_structs::APIErrorResponse;

#[derive(Debug, Clone, PartialEq)]
pub enum APIErrorVariant {
    /// The server could not be reached
    Network,
    /// The server answered with a status other than the expected one
    UnexpectedStatusCode,
    MalformedResponse,
}

#[derive(Debug, Clone)]
pub struct APIError {
    pub variant: APIErrorVariant,
    pub status: Option<u16>,
    /// Error category sent by the server, e.g. `CONFLICT`
    pub category: Option<String>,
    pub message: String,
}

pub type APIResponse<T> = Result<T, APIError>;

pub(crate) struct BaseClient {
    client: Client,
    address: String,
}

impl BaseClient {
    pub fn new(address: String) -> Self {
        Self {
            client: Client::new(),
            address,
        }
    }

    fn url(&self, path: String) -> String {
        format!("{}/api/v1/{}", self.address, path)
    }

    async fn handle_api_response<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res: Response = req.send().await.map_err(|e| APIError {
            variant: APIErrorVariant::Network,
            status: None,
            category: None,
            message: e.to_string(),
        })?;

        let status = res.status();
        if status != expected_status_code {
            let body = res.json::<APIErrorResponse>().await.ok();
            return Err(APIError {
                variant: APIErrorVariant::UnexpectedStatusCode,
                status: Some(status.as_u16()),
                category: body.as_ref().map(|body| body.category.clone()),
                message: body
                    .map(|body| body.message)
                    .unwrap_or_else(|| format!("Unexpected status code: {}", status)),
            });
        }

        res.json::<T>().await.map_err(|e| APIError {
            variant: APIErrorVariant::MalformedResponse,
            status: Some(status.as_u16()),
            category: None,
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.client.get(self.url(path));
        self.handle_api_response(req, expected_status_code).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: String,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.client.get(self.url(path)).query(query);
        self.handle_api_response(req, expected_status_code).await
    }

    pub async fn delete<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: String,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.client.delete(self.url(path)).query(query);
        self.handle_api_response(req, expected_status_code).await
    }

    pub async fn post<T: DeserializeOwned, S: Serialize>(
        &self,
        body: S,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.client.post(self.url(path)).json(&body);
        self.handle_api_response(req, expected_status_code).await
    }

    pub async fn put<T: DeserializeOwned, S: Serialize, Q: Serialize + ?Sized>(
        &self,
        body: S,
        path: String,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.client.put(self.url(path)).query(query).json(&body);
        self.handle_api_response(req, expected_status_code).await
    }
}
