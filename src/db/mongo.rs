use log::{info, warn};
use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

pub const DATABASE: &str = "Travelers";

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Stable API, MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    if let Err(e) = ping(&client).await {
        warn!("Connected to MongoDB but ping failed: {}", e);
        warn!("Preference learning and trip storage may be unavailable");
    } else {
        info!("MongoDB connection verified with ping");
    }

    Ok(Arc::new(client))
}

pub async fn ping(client: &Client) -> Result<(), mongodb::error::Error> {
    client
        .database(DATABASE)
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(())
}
