//! Sign or watermark a PDF from the command line.
//!
//! Usage:
//!   pdf_stamp sign <input.pdf> --cert signer.p12 --password secret --image sig.png
//!       --rect x,y,width,height [--pages first|all|N|S-E] [--reason R] [--location L] [--output out.pdf]
//!   pdf_stamp watermark-image <input.pdf> --image logo.png [--opacity 0.3] [--output out.pdf]
//!   pdf_stamp watermark-text <input.pdf> --text DRAFT [--font Helvetica-Bold] [--font-size 48]
//!       [--color #808080] [--opacity 0.3] [--output out.pdf]
//!
//! Without `--output` the input file is updated in place (incremental save).
//! Set `RUST_LOG=debug` for per-page logging.

use pdf_stamp::geometry::Rect;
use pdf_stamp::signatures::VerificationStatus;
use pdf_stamp::writer::{Color, StandardFont, TextStyle};
use pdf_stamp::{ImageSource, PageRange, PdfDocument, SaveMode, SignatureRequest, StampConfig};
use std::path::PathBuf;
use std::process;

enum Command {
    Sign,
    WatermarkImage,
    WatermarkText,
}

struct CliConfig {
    command: Command,
    input: PathBuf,
    output: Option<PathBuf>,
    cert: Option<PathBuf>,
    password: String,
    image: Option<PathBuf>,
    text: Option<String>,
    rect: Option<Rect>,
    pages: PageRange,
    reason: Option<String>,
    location: Option<String>,
    opacity: Option<f64>,
    style: TextStyle,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        Self::parse(std::env::args().collect())
    }

    fn parse(args: Vec<String>) -> Result<Self, String> {
        if args.len() < 3 {
            return Err("expected a command and an input file".to_string());
        }

        let command = match args[1].as_str() {
            "sign" => Command::Sign,
            "watermark-image" => Command::WatermarkImage,
            "watermark-text" => Command::WatermarkText,
            other => return Err(format!("unknown command '{}'", other)),
        };

        let mut config = Self {
            command,
            input: PathBuf::from(&args[2]),
            output: None,
            cert: None,
            password: String::new(),
            image: None,
            text: None,
            rect: None,
            pages: PageRange::First,
            reason: None,
            location: None,
            opacity: None,
            style: TextStyle::default(),
        };

        let mut i = 3;
        while i < args.len() {
            let flag = args[i].as_str();
            i += 1;
            let value = args
                .get(i)
                .cloned()
                .ok_or_else(|| format!("missing value for {}", flag))?;
            match flag {
                "--output" | "-o" => config.output = Some(PathBuf::from(value)),
                "--cert" => config.cert = Some(PathBuf::from(value)),
                "--password" => config.password = value,
                "--image" => config.image = Some(PathBuf::from(value)),
                "--text" => config.text = Some(value),
                "--rect" => config.rect = Some(parse_rect(&value)?),
                "--pages" => config.pages = parse_pages(&value)?,
                "--reason" => config.reason = Some(value),
                "--location" => config.location = Some(value),
                "--opacity" => {
                    config.opacity = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid opacity '{}'", value))?,
                    )
                },
                "--font" => {
                    let font = StandardFont::from_name(&value)
                        .ok_or_else(|| format!("unknown font '{}'", value))?;
                    config.style.font = font;
                },
                "--font-size" => {
                    config.style.font_size = value
                        .parse()
                        .map_err(|_| format!("invalid font size '{}'", value))?
                },
                "--color" => {
                    config.style.color =
                        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{}'", value))?
                },
                _ => return Err(format!("unknown option {}", flag)),
            }
            i += 1;
        }

        Ok(config)
    }

    fn save_mode(&self) -> SaveMode<'static> {
        match &self.output {
            Some(path) => SaveMode::to_path(path.clone()),
            None => SaveMode::Incremental,
        }
    }
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("invalid rectangle '{}'", value))?;
    match parts.as_slice() {
        [x, y, width, height] => Ok(Rect::new(*x, *y, *width, *height)),
        _ => Err(format!("rectangle needs x,y,width,height: '{}'", value)),
    }
}

fn parse_pages(value: &str) -> Result<PageRange, String> {
    let invalid = || format!("invalid page range '{}'", value);
    match value {
        "first" => Ok(PageRange::First),
        "all" => Ok(PageRange::All),
        _ => match value.split_once('-') {
            Some((start, end)) => Ok(PageRange::span(
                start.parse().map_err(|_| invalid())?,
                end.parse().map_err(|_| invalid())?,
            )),
            None => Ok(PageRange::page(value.parse().map_err(|_| invalid())?)),
        },
    }
}

fn run(config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut stamp_config = StampConfig::new().with_text_style(config.style.clone());
    if let Some(opacity) = config.opacity {
        stamp_config = stamp_config.with_watermark_opacity(opacity);
    }
    let mut doc = PdfDocument::open(&config.input)?.with_config(stamp_config);

    match config.command {
        Command::Sign => {
            let cert = config.cert.clone().ok_or("sign requires --cert")?;
            let image = config.image.clone().ok_or("sign requires --image")?;
            let rect = config.rect.ok_or("sign requires --rect")?;

            let mut request =
                SignatureRequest::new(cert, config.password.clone(), image, rect).pages(config.pages);
            if let Some(reason) = &config.reason {
                request = request.reason(reason.clone());
            }
            if let Some(location) = &config.location {
                request = request.location(location.clone());
            }

            let field = doc.sign(&request, config.save_mode())?;
            println!("Signed field: {}", field);

            for result in doc.verify_signatures()? {
                let status = match result.status {
                    VerificationStatus::Valid => "valid",
                    VerificationStatus::ValidWithWarnings => "valid (with warnings)",
                    VerificationStatus::Invalid => "INVALID",
                };
                println!("  {} {}", result.field_name, status);
                for message in &result.messages {
                    println!("    {}", message);
                }
            }
        },
        Command::WatermarkImage => {
            let image = config.image.clone().ok_or("watermark-image requires --image")?;
            doc.watermark_image(ImageSource::Path(image), config.save_mode())?;
            println!("Watermarked {} page(s)", doc.page_count());
        },
        Command::WatermarkText => {
            let text = config.text.clone().ok_or("watermark-text requires --text")?;
            doc.watermark_text(&text, config.save_mode())?;
            println!("Watermarked {} page(s)", doc.page_count());
        },
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let config = match CliConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: pdf_stamp <sign|watermark-image|watermark-text> <input.pdf> [options]");
            process::exit(2);
        },
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_text_style_flags() {
        let config = CliConfig::parse(args(&[
            "pdf_stamp",
            "watermark-text",
            "in.pdf",
            "--text",
            "DRAFT",
            "--font",
            "Courier-Bold",
            "--font-size",
            "30",
            "--color",
            "#ff0000",
        ]))
        .unwrap();
        assert_eq!(config.style.font, StandardFont::CourierBold);
        assert_eq!(config.style.font_size, 30.0);
        assert_eq!(config.style.color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_bad_font_and_color_are_reported() {
        let base = ["pdf_stamp", "watermark-text", "in.pdf"];
        let err = CliConfig::parse(args(&[&base[..], &["--font", "Comic Sans"][..]].concat())).err();
        assert_eq!(err.as_deref(), Some("unknown font 'Comic Sans'"));
        let err = CliConfig::parse(args(&[&base[..], &["--color", "red"][..]].concat())).err();
        assert_eq!(err.as_deref(), Some("invalid color 'red'"));
    }

    #[test]
    fn test_parse_pages_and_rect() {
        assert!(matches!(parse_pages("all"), Ok(PageRange::All)));
        assert_eq!(parse_pages("2-4").unwrap(), PageRange::span(2, 4));
        assert_eq!(parse_rect("1,2,3,4").unwrap(), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert!(parse_rect("1,2,3").is_err());
    }
}
