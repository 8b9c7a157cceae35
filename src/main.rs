use std::env;
use std::fs;
use std::path::Path;
use std::process;

use qrforge::{EncodeMode, ErrorLevel, QrSymbol, Rgb};

struct Options {
    text: String,
    mode: EncodeMode,
    version: u8,
    level: ErrorLevel,
    cell_size: usize,
    margin: Option<usize>,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    output: Option<String>,
    data_url: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            text: "https://example.com/".to_string(),
            mode: EncodeMode::Byte,
            version: 0,
            level: ErrorLevel::M,
            cell_size: 4,
            margin: None,
            fg: None,
            bg: None,
            output: None,
            data_url: false,
        }
    }
}

fn print_help(program_name: &str) {
    println!("Usage: {} [options]", program_name);
    println!();
    println!("Options:");
    println!("  --text, -t <data>          Data to encode (default: https://example.com/)");
    println!("  --mode, -m <mode>          Numeric | Alphanumeric | Byte | Kanji (default: Byte)");
    println!("  --version, -v [0-40]       Symbol version, 0 = auto (default: 0)");
    println!("  --ecc-level, -l [L|M|Q|H]  Error correction level (default: M)");
    println!("  --cell-size, -c <px>       Pixels per module (default: 4)");
    println!("  --margin <px>              Quiet zone in pixels (default: 4 * cell size)");
    println!("  --fg <#RRGGBB>             PNG foreground colour");
    println!("  --bg <#RRGGBB>             PNG background colour");
    println!("  --output, -o <file>        Write .png, .gif, .svg, .html or .txt");
    println!("  --data-url                 Print a data URL instead of writing a file");
    println!("  --help, -h                 Show this help message");
    println!();
    println!("Without --output the symbol is printed to the terminal.");
}

fn parse_color(value: &str) -> Option<Rgb> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

fn required_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("{flag} requires a value.");
            process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--text" | "-t" => {
                options.text = required_value(args, i, "--text").to_string();
                i += 1;
            }
            "--mode" | "-m" => {
                let value = required_value(args, i, "--mode");
                options.mode = match EncodeMode::from_name(value) {
                    Ok(mode) => mode,
                    Err(_) => {
                        eprintln!("Invalid mode. Use Numeric, Alphanumeric, Byte or Kanji.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--version" | "-v" => {
                let value = required_value(args, i, "--version");
                options.version = match value.parse::<u8>() {
                    Ok(v @ 0..=40) => v,
                    _ => {
                        eprintln!("Invalid version. Use 0 (auto) through 40.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--ecc-level" | "-l" => {
                let value = required_value(args, i, "--ecc-level");
                options.level = match ErrorLevel::from_name(value) {
                    Ok(level) => level,
                    Err(_) => {
                        eprintln!("Invalid ECC level. Use L, M, Q, or H.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--cell-size" | "-c" => {
                let value = required_value(args, i, "--cell-size");
                options.cell_size = match value.parse::<usize>() {
                    Ok(size) if size > 0 => size,
                    _ => {
                        eprintln!("Invalid cell size.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--margin" => {
                let value = required_value(args, i, "--margin");
                options.margin = match value.parse::<usize>() {
                    Ok(margin) => Some(margin),
                    Err(_) => {
                        eprintln!("Invalid margin.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--fg" => {
                let value = required_value(args, i, "--fg");
                options.fg = match parse_color(value) {
                    Some(color) => Some(color),
                    None => {
                        eprintln!("Invalid colour. Use #RRGGBB.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--bg" => {
                let value = required_value(args, i, "--bg");
                options.bg = match parse_color(value) {
                    Some(color) => Some(color),
                    None => {
                        eprintln!("Invalid colour. Use #RRGGBB.");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--output" | "-o" => {
                options.output = Some(required_value(args, i, "--output").to_string());
                i += 1;
            }
            "--data-url" => options.data_url = true,
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}. Use --help for usage information.");
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = parse_options(&args);

    let mut symbol = QrSymbol::new(options.version, options.level)?;
    symbol.add_data_in_mode(&options.text, options.mode);
    symbol.make()?;

    let cell = options.cell_size;
    let margin = options.margin.unwrap_or(cell * 4);

    if options.data_url {
        let extension = options
            .output
            .as_deref()
            .and_then(|p| Path::new(p).extension())
            .and_then(|e| e.to_str());
        let url = match extension {
            Some("gif") => symbol.gif_data_url(cell, margin)?,
            _ => symbol.png_data_url(cell, margin, options.fg, options.bg)?,
        };
        println!("{url}");
        return Ok(());
    }

    let Some(output) = options.output else {
        print!("{}", symbol.ascii_text(1, 2)?);
        return Ok(());
    };

    let extension = Path::new(&output)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match extension {
        "png" => fs::write(&output, symbol.png_bytes(cell, margin, options.fg, options.bg)?)?,
        "gif" => fs::write(&output, symbol.gif_bytes(cell, margin)?)?,
        "svg" => {
            let n = symbol.module_count()?;
            let side = n * cell + 2 * margin;
            let svg = format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {side} {side}\">\
                 <path d=\"{}\" stroke=\"transparent\" fill=\"black\"/></svg>\n",
                symbol.svg_path(cell, margin)?
            );
            fs::write(&output, svg)?;
        }
        "html" => fs::write(&output, symbol.html_table(cell, margin)?)?,
        "txt" => fs::write(&output, symbol.ascii_text(2, 4)?)?,
        _ => {
            eprintln!("Unsupported output extension. Use .png, .gif, .svg, .html or .txt.");
            process::exit(1);
        }
    }

    println!(
        "QR code saved to {} (version {}, level {}, mask {})",
        output,
        symbol.version()?.number(),
        symbol.error_level().name(),
        symbol.mask_pattern()?.index()
    );
    Ok(())
}
