use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_weather::{Coordinate, IpLocator, LocationSource, Unsupported};
use skycast_widget::{MemorySurface, SurfaceSnapshot, WidgetSession, WidgetSurface};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands:
  click LAT LON   click the map at a coordinate
  type TEXT       type into the search box
  show            print the widget state
  quit            exit";

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let mut app = skycast_core::App::new()?;
    let config = app.shared_config();

    tracing::info!("SkyCast started");
    println!("SkyCast - map-driven weather lookup");
    println!("Config directory: {}", config.config_dir.display());

    let surface = Arc::new(MemorySurface::new());
    let session = WidgetSession::from_config(&config, surface.clone())?;

    let locator: Box<dyn LocationSource> = if config.location.detect {
        match IpLocator::new(
            config.location.geolocation_url.as_str(),
            Duration::from_secs(config.http.timeout_secs),
        ) {
            Ok(locator) => Box::new(locator),
            Err(e) => {
                tracing::warn!("Geolocation unavailable: {}", e);
                Box::new(Unsupported)
            }
        }
    } else {
        Box::new(Unsupported)
    };

    let at = session.start(locator.as_ref()).await;
    println!("Map centered on {}", at);
    if let Some(tiles) = surface.snapshot().tiles {
        println!("Tiles: {} ({})", tiles.url_template, tiles.attribution);
    }
    print_snapshot(&surface.snapshot());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => continue,
            "click" => match parse_coordinate(rest) {
                Some(at) => session.on_map_click(at).await,
                None => {
                    println!("usage: click LAT LON");
                    continue;
                }
            },
            "type" => {
                surface.set_search_value(rest);
                session.on_search_keyup();
                session.search_settled().await;
            }
            "show" => {}
            "quit" | "exit" => break,
            _ => {
                println!("{}", HELP);
                continue;
            }
        }
        print_snapshot(&surface.snapshot());
    }

    app.shutdown()?;
    Ok(())
}

fn parse_coordinate(args: &str) -> Option<Coordinate> {
    let mut parts = args.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(latitude)), Some(Ok(longitude)), None) => {
            Some(Coordinate::new(latitude, longitude))
        }
        _ => None,
    }
}

fn print_snapshot(snapshot: &SurfaceSnapshot) {
    println!("---");
    if let Some(map) = &snapshot.map {
        print!("map: center {} zoom {}", map.center, map.zoom);
        match map.marker {
            Some(marker) => println!(" marker {}", marker),
            None => println!(),
        }
    }
    println!("search: {:?}", snapshot.search);
    println!("loading: {}", snapshot.loading);
    println!("results: {}", snapshot.results);
}
