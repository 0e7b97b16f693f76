use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use cartsync::binder::PageEvent;
use cartsync::config::{Cli, Command, Config, default_config_path};
use cartsync::controller::CartController;
use cartsync::model::CartActionResult;
use cartsync::page::{ElementId, Page, SharedPage};
use cartsync::service::HttpCartService;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %format!("{:#}", e), "cartsync failed");
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    let config_path = args
        .config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = Config::new(&config_path.to_string_lossy())
        .with_context(|| format!("failed to load config file {:?}", config_path))?;

    let page = match &args.page_path {
        Some(path) => Page::load(path).with_context(|| format!("failed to load page fixture {}", path))?,
        None => Page::new(),
    };
    let page = SharedPage::new(page);

    let service = HttpCartService::new(&cfg.service).context("failed to build cart service client")?;
    let controller = CartController::new(&cfg, page.clone(), Arc::new(service));
    let sync = controller.synchronizer();

    let result = match args.command {
        Command::Add { product_id, quantity } => sync.add_item(&product_id, quantity).await,
        Command::Remove { product_id } => sync.remove_item(&product_id).await,
        Command::Update { product_id, quantity } => sync.update_item_quantity(&product_id, quantity).await,
        Command::Count => sync.refresh_count().await,
        Command::Click { element } => dispatch(&controller, PageEvent::click(ElementId(element))).await?,
        Command::Change { element, value } => {
            let target = ElementId(element);
            if !page.with(|p| p.set_value(target, &value)) {
                return Err(anyhow!("no element {} on page", target));
            }
            dispatch(&controller, PageEvent::change(target)).await?
        }
    };

    let summary = serde_json::json!({
        "result": summarize(&result),
        "view": controller.view_state(),
        "page": page.to_json(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if result.is_success() {
        Ok(())
    } else {
        Err(anyhow!("cart request did not succeed"))
    }
}

async fn dispatch(controller: &CartController, event: PageEvent) -> Result<CartActionResult> {
    let handle = controller
        .dispatch(event)
        .ok_or_else(|| anyhow!("element {} is not a bound cart control", event.target))?;
    Ok(handle.await?)
}

fn summarize(result: &CartActionResult) -> serde_json::Value {
    match result {
        CartActionResult::Success { snapshot, message, .. } => serde_json::json!({
            "success": true,
            "message": message,
            "snapshot": snapshot,
        }),
        CartActionResult::Failure(e) => serde_json::json!({
            "success": false,
            "kind": format!("{:?}", e.kind()),
            "error": e.user_message(),
            "detail": e.to_string(),
        }),
    }
}
