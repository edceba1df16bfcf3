use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub success: bool,
    pub status: String,
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub verified_at: String,
    pub message: String,
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        }
    }

    /// Liveness check; true on a 2xx reply.
    pub async fn health(&self) -> Result<bool, reqwest::Error> {
        let resp = self.client
            .get(format!("{}/health", self.gateway_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Verify a payment through the stub endpoint.
    pub async fn verify_payment(&self, req: &VerifyRequest) -> Result<PaymentVerification, Box<dyn std::error::Error>> {
        let resp = self.client
            .post(format!("{}/api/payment/verify", self.gateway_url))
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Gateway returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<PaymentVerification>(&text)?)
    }

    /// GET an upstream path through the proxy.
    pub async fn proxy_get(&self, path: &str, authorization: Option<&str>) -> Result<Response, reqwest::Error> {
        let mut req = self.client.get(self.proxy_url(path));
        if let Some(auth) = authorization {
            req = req.header("Authorization", auth);
        }
        req.send().await
    }

    /// POST a JSON body to an upstream path through the proxy.
    pub async fn proxy_post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        authorization: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let mut req = self.client.post(self.proxy_url(path)).json(body);
        if let Some(auth) = authorization {
            req = req.header("Authorization", auth);
        }
        req.send().await
    }

    fn proxy_url(&self, path: &str) -> String {
        format!("{}/api/proxy/{}", self.gateway_url, path.trim_start_matches('/'))
    }
}
