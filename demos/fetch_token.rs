//! Demonstrates fetching a client-credentials access token against a mock directory-service
//! token endpoint and reusing the cached value on the second call.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use token_provider::provider::TokenProvider;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/contoso.onmicrosoft.com/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":\"3600\"}",
			);
		})
		.await;
	let provider = TokenProvider::new("contoso.onmicrosoft.com", "demo-client", "super-secret")
		.with_endpoint_base(Url::parse(&server.base_url())?);
	let first = provider.access_token("https://api.example.com").await?;
	let second = provider.access_token("https://api.example.com").await?;

	assert_eq!(first, second);
	println!("Reusable access token: {first}.");

	token_mock.assert_async().await;

	Ok(())
}
