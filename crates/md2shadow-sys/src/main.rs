// main.rs — headless driver
//
// Loads one model, then runs the per-frame sequence against a recording
// backend and logs what each frame would have drawn. Window and GPU setup
// live elsewhere.
//
//   md2shadow [+set name value ...] <model.md2> [skin]

use std::error::Error;
use std::process::ExitCode;

use log::{error, info};

use md2shadow_common::config::Config;
use md2shadow_renderer::backend::RecordingBackend;
use md2shadow_renderer::Scene;

fn report(err: &dyn Error) {
    error!("{}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = Config::default();
    let rest = match config.apply_early_commands(&args) {
        Ok(rest) => rest,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let Some(model_path) = rest.first() else {
        error!("usage: md2shadow [+set name value ...] <model.md2> [skin]");
        return ExitCode::FAILURE;
    };
    if let Some(skin) = rest.get(1) {
        info!("skin {}", skin);
    }

    let frames = config.frames;
    let mut scene = Scene::new(config);
    if let Err(e) = scene.load_model(model_path) {
        report(&e);
        return ExitCode::FAILURE;
    }

    let mut backend = RecordingBackend::new();
    for _ in 0..frames {
        backend.clear();
        let stats = scene.render(&mut backend);
        info!(
            "frame {}: {} lights, {} silhouette quads, {} near cap, {} far cap, {} draw calls",
            stats.frame,
            stats.lights,
            stats.silhouette_quads,
            stats.near_cap,
            stats.far_cap,
            backend.calls.len()
        );
        scene.advance();
    }

    ExitCode::SUCCESS
}
