//! Command-line interface for strip_risk
//!
//! Classifies one strip photo and prints the analysis as JSON.

use std::path::Path;
use std::{env, process};

use strip_risk::image_loader::{load_data_url, load_image};
use strip_risk::sampling::Quad;
use strip_risk::{AnalysisConfig, AnalysisError, RegionShape, StripAnalyzer};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    fail(&AnalysisError::invalid_input("--config needs a file path"));
                }
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => positional.push(arg.to_string()),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let (image_arg, corners_arg) = match positional.as_slice() {
        [image] => (image.as_str(), None),
        [image, corners] => (image.as_str(), Some(corners.as_str())),
        _ => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    match run(image_arg, corners_arg, config_path.as_deref()) {
        Ok(json) => println!("{}", json),
        Err(error) => fail(&error),
    }
}

fn run(image_arg: &str, corners_arg: Option<&str>, config_path: Option<&str>) -> Result<String, AnalysisError> {
    let config = match config_path {
        Some(path) => AnalysisConfig::from_json_file(Path::new(path))?,
        None => AnalysisConfig::default(),
    };

    let image = if image_arg.starts_with("data:") || (!Path::new(image_arg).exists() && looks_like_base64(image_arg)) {
        load_data_url(image_arg)?
    } else {
        load_image(Path::new(image_arg))?
    };

    let shape = match corners_arg {
        Some(json) => {
            let quad: Quad = serde_json::from_str(json).map_err(|e| {
                AnalysisError::invalid_input(format!("corners must be {{tl,tr,bl,br}} in percent: {}", e))
            })?;
            RegionShape::Quadrilateral(quad)
        }
        None => RegionShape::CenterBox,
    };

    let analysis = StripAnalyzer::new(config)?.analyze(&image, &shape)?;
    serde_json::to_string_pretty(&analysis)
        .map_err(|e| AnalysisError::invalid_input(format!("could not serialize result: {}", e)))
}

fn looks_like_base64(arg: &str) -> bool {
    arg.len() > 64
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r'))
}

fn fail(error: &AnalysisError) -> ! {
    let body = serde_json::json!({ "error": error.to_string() });
    println!("{}", body);
    if error.is_recoverable() {
        eprintln!("Suggestion: {}", error.user_message());
    }
    process::exit(1);
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path|data_url> [corners_json]", program_name);
    eprintln!();
    eprintln!("Classify a colorimetric test strip as safe, warning or danger.");
    eprintln!();
    eprintln!("Without corners the center 30% x 15% of the frame is sampled.");
    eprintln!("Corners are percentages of the frame, e.g.");
    eprintln!(r#"  '{{"tl":{{"x":30,"y":20}},"tr":{{"x":70,"y":20}},"bl":{{"x":30,"y":80}},"br":{{"x":70,"y":80}}}}'"#);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE    Load analysis configuration from JSON");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=info for pipeline logging.");
}
