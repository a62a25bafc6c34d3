//! Strata - a terminal browser for netCDF-4 / HDF5 containers.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use strata::app::App;
use strata::data::{ensure_loaded, TreeReader};
use strata::grid::GridView;
use strata::recent::RecentFiles;
use strata::store::NetcdfStore;
use strata::{ui, util};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "A terminal browser for netCDF-4 / HDF5 containers", long_about = None)]
struct Args {
    /// Container files to open
    files: Vec<PathBuf>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Recent-files list to use instead of the default location
    #[arg(long, value_name = "PATH")]
    recent_file: Option<PathBuf>,

    /// Print the object tree of each file and exit
    #[arg(long, conflicts_with_all = ["show", "recent"])]
    dump: bool,

    /// Print the first layer of one dataset or attribute (e.g. /grp/var or /var/units) and exit
    #[arg(long, value_name = "OBJECT", conflicts_with = "recent")]
    show: Option<String>,

    /// Print the recently opened files and exit
    #[arg(long)]
    recent: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let file = File::create(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting Strata");
    }

    let recent_path = args.recent_file.clone().or_else(RecentFiles::default_location);

    if args.recent {
        return print_recent(recent_path.as_deref());
    }
    if args.dump {
        return dump(&args.files);
    }
    if let Some(object) = &args.show {
        return show(&args.files, object);
    }

    // Validate paths
    for path in &args.files {
        if !path.exists() {
            eprintln!("Error: Path not found: {}", path.display());
            std::process::exit(1);
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let mut app = App::new(NetcdfStore, recent_path);
    for path in &args.files {
        app.open_file(path);
    }
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    if args.log.is_some() {
        tracing::info!("Strata exited");
    }

    Ok(())
}

fn print_recent(recent_path: Option<&Path>) -> Result<()> {
    let Some(path) = recent_path else {
        bail!("No location for the recent-files list; pass --recent-file");
    };
    let recent = RecentFiles::load(path)?;
    if recent.is_empty() {
        println!("No recent files");
    }
    for file in recent.entries() {
        println!("{}", file.display());
    }
    Ok(())
}

fn dump(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        bail!("--dump needs at least one file");
    }
    for path in files {
        let container = TreeReader::read_file(&NetcdfStore, path)?;
        print!("{}", util::format_tree(&container));
    }
    Ok(())
}

fn show(files: &[PathBuf], object: &str) -> Result<()> {
    let [path] = files else {
        bail!("--show needs exactly one file");
    };
    let store = NetcdfStore;
    let mut container = TreeReader::read_file(&store, path)?;
    let Some(node) = util::find_node_mut(&mut container.root_node, object) else {
        bail!("No object {} in {}", object, path.display());
    };
    if node.is_group() {
        bail!("{} is a group", object);
    }
    if !node.is_numeric() {
        bail!("{} is not numeric; no grid view", object);
    }
    ensure_loaded(&store, node)?;

    let Some(dataset) = node.dataset.as_ref() else {
        bail!("{} has no data", object);
    };
    let view = GridView::for_dataset(dataset);
    let (rows, cols) = view.shape();
    println!("# {} {} ({} x {})", object, dataset.summary(), rows, cols);
    print!("{}", util::format_grid_tsv(&view, dataset));
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App<NetcdfStore>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Grid viewer - handle separately
                if app.viewer.visible {
                    match (key.modifiers, key.code) {
                        (KeyModifiers::NONE, KeyCode::Esc)
                        | (KeyModifiers::NONE, KeyCode::Char('q')) => {
                            app.close_overlay();
                        },
                        // Pan with hjkl or arrows
                        (KeyModifiers::NONE, KeyCode::Up)
                        | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                            app.viewer.scroll_up(1);
                        },
                        (KeyModifiers::NONE, KeyCode::Down)
                        | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                            app.viewer.scroll_down(1);
                        },
                        (KeyModifiers::NONE, KeyCode::Left)
                        | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                            app.viewer.scroll_left(1);
                        },
                        (KeyModifiers::NONE, KeyCode::Right)
                        | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                            app.viewer.scroll_right(1);
                        },
                        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                            app.viewer.scroll_up(10);
                        },
                        (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                            app.viewer.scroll_down(10);
                        },
                        // Layer navigation
                        (KeyModifiers::NONE, KeyCode::Char('s')) => {
                            app.viewer.next_layer_dim();
                            app.show_layer_status();
                        },
                        (KeyModifiers::NONE, KeyCode::Char(']'))
                        | (KeyModifiers::NONE, KeyCode::PageDown) => {
                            app.viewer.advance();
                            app.show_layer_status();
                        },
                        (KeyModifiers::NONE, KeyCode::Char('['))
                        | (KeyModifiers::NONE, KeyCode::PageUp) => {
                            app.viewer.retreat();
                            app.show_layer_status();
                        },
                        (KeyModifiers::NONE, KeyCode::Char('g')) => {
                            app.viewer.first_layer();
                            app.show_layer_status();
                        },
                        // [count]G jumps to layer count, plain G to the last
                        (KeyModifiers::NONE, KeyCode::Char(c)) if c.is_ascii_digit() => {
                            if let Some(digit) = c.to_digit(10) {
                                app.viewer.push_digit(digit);
                            }
                            continue;
                        },
                        (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                            app.viewer.goto_pending_or_last();
                            app.show_layer_status();
                        },
                        _ => {},
                    }
                    app.viewer.clear_count();
                    continue;
                }

                match (key.modifiers, key.code) {
                    // Quit
                    (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(()),

                    // Navigation
                    (KeyModifiers::NONE, KeyCode::Up)
                    | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                        app.explorer.cursor_up();
                    },
                    (KeyModifiers::NONE, KeyCode::Down)
                    | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                        app.explorer.cursor_down();
                    },
                    (KeyModifiers::NONE, KeyCode::Left)
                    | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                        app.collapse();
                    },
                    (KeyModifiers::NONE, KeyCode::Right)
                    | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                        app.expand();
                    },
                    (KeyModifiers::NONE, KeyCode::Char('g')) => {
                        app.explorer.goto_first();
                    },
                    (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                        app.explorer.goto_last();
                    },

                    // Features
                    (KeyModifiers::NONE, KeyCode::Enter) => {
                        app.view_current();
                    },
                    (KeyModifiers::NONE, KeyCode::Char('o')) => {
                        app.open_recent();
                    },
                    (KeyModifiers::NONE, KeyCode::Char('t')) => {
                        app.toggle_preview();
                    },
                    (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
                        app.cycle_theme();
                    },

                    // Details scrolling
                    (KeyModifiers::SHIFT, KeyCode::Char('J')) => {
                        app.explorer.scroll_down();
                    },
                    (KeyModifiers::SHIFT, KeyCode::Char('K')) => {
                        app.explorer.scroll_up();
                    },

                    (KeyModifiers::NONE, KeyCode::Esc) => {
                        app.error_message = None;
                    },

                    _ => {},
                }
            }
        }
    }
}
