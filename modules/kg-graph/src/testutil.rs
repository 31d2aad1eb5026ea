//! Test utilities for spinning up a real Neo4j instance via testcontainers.

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage,
};

use crate::GraphClient;

pub async fn neo4j_container() -> (ContainerAsync<GenericImage>, GraphClient) {
    let image = GenericImage::new("neo4j", "5-community")
        .with_exposed_port(ContainerPort::Tcp(7687))
        .with_wait_for(WaitFor::message_on_stdout("Bolt enabled"))
        .with_env_var("NEO4J_AUTH", "none");

    let container = image.start().await.expect("failed to start neo4j container");
    let host_port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("failed to get neo4j host port");

    let uri = format!("bolt://127.0.0.1:{host_port}");
    let client = GraphClient::connect(&uri, "", "")
        .await
        .expect("failed to connect to neo4j");

    (container, client)
}
