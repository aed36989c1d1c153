use crate::web::error::WebError;
use crate::web::error::WebError::CantCreateClient;
use crate::tools::log_message_and_return;
use reqwest::Client;
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<Client, WebError> {
    reqwest::ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(log_message_and_return(
            "Can't build HTTP client.",
            CantCreateClient,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_client() {
        assert!(build_client(Duration::from_secs(1)).is_ok());
    }
}
