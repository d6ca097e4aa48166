use actix_web::{
    get, middleware,
    web::{self},
    App, HttpResponse, HttpServer, Responder,
};
use clap::Parser;
use std::io::Read;

use timeframe_server::{errors, errors::ResultExt, frame, handlers, serve_static_file, store::Store};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    Serve {
        /// Path to the application settings JSON (supplies `common.locale`)
        settings: Option<String>,
    },
}

#[get("/")]
async fn root_index_handler() -> Result<impl Responder, actix_web::Error> {
    use maud::html;

    let default_value = frame::encode(&frame::RangeState::default());

    return Ok(html! {
        (handlers::Css("/res/styles.css"))
        h1.page_title { "Time frame control" }
        ul {
            li {
                a href=(format!("/frame?value={}", urlencoding::encode(&default_value))) { "Custom range (default)" }
            }
            li {
                a href="/frame?value=now%20%3A%20now" { "Now to now" }
            }
        }
    });
}

async fn run() -> errors::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { settings } => {
            let store = match settings {
                Some(path) => {
                    log::info!("Loading settings: {}", path);
                    Store::from_path(path)
                        .context(&format!("Failed to load settings from {}", path))?
                }
                None => Store::empty(),
            };

            let listen_address = std::env::var("LISTEN_ADDRESS").unwrap_or("127.0.0.1".to_owned());

            log::info!("Starting HTTP server at http://{}:8080", listen_address);

            HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(store.clone()))
                    .wrap(middleware::Logger::default())
                    .service(serve_static_file!("styles.css"))
                    .service(root_index_handler)
                    .service(handlers::frame_page)
                    .service(handlers::frame_edit)
            })
            .bind((listen_address, 8080))?
            .run()
            .await?;

            Ok(())
        }
    }
}

#[actix_web::main]
async fn main() {
    if let Err(ref e) = run().await {
        log::error!("{}", e);
        ::std::process::exit(1);
    }
}
