use minserve::Server;
use minserve::config::Config;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let mut app = Server::with_config(cfg.server_config());

    app.add_path("get", "/hello/:name", |req, res| {
        let name = req.param("name").unwrap_or("stranger");
        res.set_json_body(&json!({ "hello": name }))?;
        res.send()?;
        Ok(())
    })?;

    app.add_path("get", "/", |_req, res| {
        res.set_json_body(&json!({ "ok": "ok get" }))?;
        res.send()?;
        Ok(())
    })?;

    app.add_path("post", "/", |_req, res| {
        res.set_json_body(&json!({ "ok": "ok post" }))?;
        res.send()?;
        Ok(())
    })?;

    tokio::select! {
        res = app.listen(&cfg.listen_addr) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
