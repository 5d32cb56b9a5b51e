use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;
use std::fs;
use std::io::{self, Write};
use std::process;

use cbmbrowse::browse::{
    Backend, BrowseMode, Browser, BrowserConfig, DirectoryEntry, HostDirectory, ListingImage,
    MountKind, Movement, Progress, Selection, FIRST_DEVICE, LAST_DEVICE,
};

// Possible exit codes
static _EXIT_SUCCESS: i32 = 0;
static EXIT_FAILURE: i32 = 1;

/// Keys accepted by the `page` subcommand, mirroring the menu's browser.
static KEY_HELP: &str = "Navigation keys, applied in order: \
j=down k=up p=page down u=page up t=top e=end s=toggle sort r=refresh \
>=select <=parent ^=root n=next device N=previous device b=switch source";

fn main() {
    // Parse command-line arguments
    let app = App::new("Commodore Directory Browser")
        .version("0.1.0")
        .about("List and navigate IEC drive listings and Ultimate filesystem directories.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("source")
                .required(true)
                .help("A saved \"$\" listing, or a host directory to browse as an Ultimate filesystem"),
        )
        .arg(
            Arg::with_name("sort")
                .short("s")
                .long("sort")
                .help("Sort entries by name"),
        )
        .arg(
            Arg::with_name("model")
                .short("m")
                .long("model")
                .takes_value(true)
                .possible_values(&["small", "large"])
                .default_value("small")
                .help("Screen model: small (40 columns) or large (80 columns)"),
        )
        .arg(
            Arg::with_name("height")
                .short("H")
                .long("height")
                .takes_value(true)
                .validator(height_validator)
                .help("Visible rows per page (overrides the model)"),
        )
        .arg(
            Arg::with_name("device")
                .short("d")
                .long("device")
                .takes_value(true)
                .validator(device_validator)
                .default_value("8")
                .help("IEC device number the listing answers on"),
        )
        .arg(
            Arg::with_name("alternate")
                .short("a")
                .long("alternate")
                .takes_value(true)
                .help("A second source, switched to with the 'b' key"),
        )
        .arg(
            Arg::with_name("progress")
                .long("progress")
                .help("Count records on stderr while reading"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log more detail (repeat for more)"),
        )
        .subcommand(SubCommand::with_name("dir").about("Show a directory listing"))
        .subcommand(
            SubCommand::with_name("page")
                .about("Navigate the listing and show the visible page")
                .arg(
                    Arg::with_name("keys")
                        .short("k")
                        .long("keys")
                        .takes_value(true)
                        .default_value("")
                        .help(KEY_HELP),
                ),
        );

    let mut app_clone = app.clone();
    let matches = app.get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match matches.value_of("model") {
        Some("large") => BrowserConfig::large(),
        _ => BrowserConfig::small(),
    };
    if let Some(height) = matches.value_of("height") {
        config = config.with_page_height(height.parse().unwrap());
    }
    let device = matches.value_of("device").unwrap().parse().unwrap();
    let source = matches.value_of("source").unwrap();

    let mut browser = match open_backend(source, device) {
        Ok(backend) => Browser::new(backend, &config),
        Err(e) => {
            eprintln!("Error: {}: {}", source, e);
            process::exit(EXIT_FAILURE);
        }
    };
    if let Some(alternate) = matches.value_of("alternate") {
        match open_backend(alternate, device) {
            Ok(backend) => browser.set_alternate(backend),
            Err(e) => {
                eprintln!("Error: {}: {}", alternate, e);
                process::exit(EXIT_FAILURE);
            }
        }
    }
    browser.set_sorted(matches.is_present("sort"));
    if matches.is_present("progress") {
        browser.set_progress(Box::new(Ticker));
    }

    let result = match matches.subcommand() {
        ("dir", Some(_)) => cmd_dir(&mut browser),
        ("page", Some(m)) => cmd_page(&mut browser, m.value_of("keys").unwrap()),
        _ => {
            app_clone.print_help().unwrap();
            println!();
            process::exit(EXIT_FAILURE);
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(EXIT_FAILURE);
    }
}

fn u8_validator(v: String, min: u8, max: u8) -> Result<(), String> {
    match v.parse::<u8>() {
        Ok(n) if n >= min && n <= max => Ok(()),
        _ => Err(format!("Expected a value from {}-{}.", min, max)),
    }
}

/// Require a device argument in the IEC range 8-30.
fn device_validator(v: String) -> Result<(), String> {
    u8_validator(v, FIRST_DEVICE, LAST_DEVICE)
}

fn height_validator(v: String) -> Result<(), String> {
    u8_validator(v, 1, 200)
}

/// Prints a running record count on stderr.
struct Ticker;

impl Progress for Ticker {
    fn tick(&mut self, records: usize) {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "\rreading... {}", records);
        let _ = stderr.flush();
    }
}

/// A directory is browsed as an Ultimate filesystem; anything else is taken
/// to be a saved listing served on `device`.
fn open_backend(source: &str, device: u8) -> io::Result<Backend> {
    if fs::metadata(source)?.is_dir() {
        Ok(Backend::uci(HostDirectory::open(source)?))
    } else {
        Ok(Backend::iec(ListingImage::open(source, device)?, device))
    }
}

fn print_header(browser: &mut Browser) -> io::Result<()> {
    if let Some(path) = browser.path()? {
        println!("{}", path);
    }
    if let Some(label) = browser.directory().label() {
        println!("0 \"{}\"", label);
    }
    Ok(())
}

fn print_footer(browser: &Browser) {
    match browser.mode() {
        BrowseMode::Iec => println!("{} blocks free.", browser.directory().free_blocks()),
        BrowseMode::Uci => println!("{} entries.", browser.directory().len()),
    }
}

fn row(browser: &Browser, entry: &DirectoryEntry) -> String {
    let row = entry.row(browser.mode());
    match MountKind::of(&entry.name) {
        MountKind::None => row,
        kind => format!("{} {}", row, kind.marker()),
    }
}

fn cmd_dir(browser: &mut Browser) -> io::Result<()> {
    browser.refresh()?;
    print_header(browser)?;
    for (_, entry) in browser.directory().iter() {
        println!("{}", row(browser, entry));
    }
    print_footer(browser);
    Ok(())
}

fn cmd_page(browser: &mut Browser, keys: &str) -> io::Result<()> {
    browser.refresh()?;
    for key in keys.chars() {
        let movement = match key {
            'j' => browser.directory_mut().move_down(),
            'k' => browser.directory_mut().move_up(),
            'p' => browser.directory_mut().page_down(),
            'u' => browser.directory_mut().page_up(),
            't' => browser.directory_mut().jump_to_top(),
            'e' => browser.directory_mut().jump_to_end(),
            's' => {
                let sorted = browser.toggle_sort()?;
                println!("sort {}", if sorted { "on" } else { "off" });
                Movement::Page
            }
            'r' => {
                browser.refresh()?;
                Movement::Page
            }
            '>' => {
                match browser.select()? {
                    Selection::Run(name) => println!("run \"{}\"", name),
                    Selection::MemoryImage(name) => println!("load reu \"{}\"", name),
                    Selection::Entered(_) => {}
                    Selection::Nothing => println!("nothing to do"),
                }
                Movement::Page
            }
            '<' => {
                browser.parent_dir()?;
                Movement::Page
            }
            '^' => {
                browser.root_dir()?;
                Movement::Page
            }
            'n' | 'N' => {
                let device = if key == 'n' {
                    browser.next_device()?
                } else {
                    browser.previous_device()?
                };
                println!("device {}", device);
                if let Err(e) = browser.refresh() {
                    println!("{}", e);
                }
                Movement::Page
            }
            'b' => {
                match browser.switch_backend() {
                    Ok(mode) => println!("source {:?}", mode),
                    Err(e) => println!("{}", e),
                }
                Movement::Page
            }
            _ => {
                eprintln!("Error: unknown key '{}'", key);
                Movement::None
            }
        };
        log::debug!("key {}: {:?}", key, movement);
    }

    print_header(browser)?;
    let directory = browser.directory();
    for (entry, selected) in directory.visible() {
        let marker = if selected { ">" } else { " " };
        println!("{}{}", marker, row(browser, entry));
    }
    println!(
        "[{}/{}]",
        if directory.is_empty() { 0 } else { directory.position() + 1 },
        directory.len()
    );
    print_footer(browser);
    Ok(())
}
