// ============================================================================
// CoinWatch - Tableau de bord crypto dans le terminal
// ============================================================================
// Programme TUI : login, marchés, watchlist, fiche détail avec graphique
// Les données viennent de l'API CoinGecko via un worker thread
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : le worker possède son propre runtime tokio
// 4. Arc<Mutex<App>> : état partagé entre l'UI et le worker
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use coinwatch::api::{ApiClient, MarketApi};
use coinwatch::app::{App, InputMode};
use coinwatch::config::Config;
use coinwatch::models::ChartTimeframe;
use coinwatch::routes::Route;
use coinwatch::ui::events::{Event, EventHandler, DEFAULT_TICK_RATE};
use coinwatch::ui::render;
use coinwatch::worker::{spawn_worker, AppCommand, AppResult};

// ============================================================================
// Arguments de ligne de commande
// ============================================================================
// CONCEPT RUST : clap derive
// - Chaque champ devient une option --xxx
// - Les valeurs fournies remplacent celles de l'environnement
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "coinwatch", version, about = "Crypto market dashboard for the terminal")]
struct Args {
    /// Devise de cotation (usd, eur, ...)
    #[arg(long)]
    currency: Option<String>,

    /// Nombre de coins chargés sur l'écran Markets
    #[arg(long = "per-page")]
    per_page: Option<u32>,

    /// Répertoire des fichiers de log
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,
}

impl Args {
    /// Applique les options sur la configuration lue depuis l'environnement
    fn apply(self, config: &mut Config) {
        if let Some(currency) = self.currency {
            config.currency = currency.trim().to_lowercase();
        }
        if let Some(per_page) = self.per_page {
            config.per_page = per_page.max(1);
        }
        if let Some(log_dir) = self.log_dir {
            config.log_dir = log_dir;
        }
    }
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/coinwatch/logs/coinwatch.log.*
/// RUST_LOG=coinwatch=trace coinwatch
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "coinwatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour coinwatch, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinwatch=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration AVANT le terminal : une erreur s'affiche proprement
    let mut config = Config::from_env().context("Invalid configuration")?;
    args.apply(&mut config);

    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialize logging: {:#}", e);
        eprintln!("Continuing without logging...");
    });

    info!(
        currency = %config.currency,
        per_page = config.per_page,
        api = %config.api_base_url,
        "CoinWatch starting up"
    );

    let client = ApiClient::from_config(&config).context("Failed to build HTTP client")?;
    let source = MarketApi::new(client);

    let app = Arc::new(Mutex::new(App::new(&config)));

    // CONCEPT RUST : mpsc channels
    // - command : UI → worker (tokio, le worker l'attend en async)
    // - result : worker → UI (std, lu sans bloquer par try_recv)
    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_worker(source, command_rx, result_tx, app.clone()).context("Failed to start worker")?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new(DEFAULT_TICK_RATE);

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
//   3. Tick (debounce de la recherche)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: UnboundedSender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    let send_all = |commands: Vec<AppCommand>| {
        for command in commands {
            if command_tx.send(command).is_err() {
                error!("Worker channel closed, command dropped");
            }
        }
    };

    loop {
        if !lock(&app).is_running() {
            break;
        }

        // ========================================
        // 0. RÉSULTATS : tous ceux en attente
        // ========================================
        loop {
            match result_rx.try_recv() {
                Ok(result) => lock(&app).apply_result(result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, &lock(&app)))?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => {
                let commands = handle_event(&mut lock(&app), event);
                send_all(commands);
            }
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }

        // ========================================
        // 3. UPDATE : debounce de la recherche
        // ========================================
        let search = lock(&app).tick(Instant::now());
        send_all(search.into_iter().collect());
    }

    Ok(())
}

/// Un verrou empoisonné ne doit pas tuer l'UI : on reprend l'état tel quel
fn lock(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT RUST : Pattern matching avec guards
// - L'ordre des bras compte : Ctrl+C, login, modes de saisie, puis normal
// - Retourne les commandes à envoyer au worker
// ============================================================================

fn handle_event(app: &mut App, event: Event) -> Vec<AppCommand> {
    use coinwatch::ui::events::{
        get_text_char, get_timeframe_index, is_backspace_event, is_down_event, is_enter_event,
        is_escape_event, is_filter_event, is_force_quit_event, is_logout_event, is_markets_event,
        is_next_timeframe_event, is_previous_timeframe_event, is_quit_event, is_refresh_event,
        is_search_event, is_sort_event, is_sort_order_event, is_space_event, is_star_event,
        is_tab_event, is_toggle_password_event, is_up_event, is_watchlist_event,
    };

    if let Event::Tick = event {
        return Vec::new();
    }

    if is_force_quit_event(&event) {
        info!("User forced quit");
        app.quit();
        return Vec::new();
    }

    // ========================================
    // Écran de login
    // ========================================
    if app.route == Route::Login {
        if is_escape_event(&event) {
            confirm_or_quit(app);
            return Vec::new();
        }
        app.cancel_quit();

        if is_enter_event(&event) {
            return app.submit_login();
        }
        if is_tab_event(&event) {
            app.login.toggle_focus();
        } else if is_toggle_password_event(&event) {
            app.login.toggle_password_visibility();
        } else if is_backspace_event(&event) {
            app.login.backspace();
        } else if let Some(c) = get_text_char(&event) {
            app.login.push_char(c);
        }
        return Vec::new();
    }

    // ========================================
    // Saisie : recherche et filtre
    // ========================================
    match app.input_mode {
        InputMode::Search => {
            if is_escape_event(&event) {
                app.cancel_search();
            } else if is_enter_event(&event) {
                return app.open_search_hit();
            } else if is_arrow_event(&event, true) {
                app.navigate_up();
            } else if is_arrow_event(&event, false) {
                app.navigate_down();
            } else if is_backspace_event(&event) {
                app.search_backspace(Instant::now());
            } else if let Some(c) = get_text_char(&event) {
                app.search_push(c, Instant::now());
            }
            return Vec::new();
        }
        InputMode::Filter => {
            if is_enter_event(&event) || is_escape_event(&event) {
                app.stop_filter();
            } else if is_backspace_event(&event) {
                app.filter_backspace();
            } else if let Some(c) = get_text_char(&event) {
                app.filter_push(c);
            }
            return Vec::new();
        }
        InputMode::Normal => {}
    }

    // ========================================
    // Mode normal
    // ========================================
    if is_quit_event(&event) {
        confirm_or_quit(app);
        return Vec::new();
    }
    app.cancel_quit();

    let route = app.route.clone();
    let on_detail = matches!(route, Route::CoinDetail(_));

    if is_markets_event(&event) {
        return app.navigate(Route::Dashboard);
    }
    if is_watchlist_event(&event) {
        return app.navigate(Route::Watchlist);
    }
    if is_logout_event(&event) {
        return app.logout();
    }
    if is_refresh_event(&event) {
        debug!(route = %app.route, "User refreshed");
        return app.refresh();
    }
    if is_star_event(&event) {
        if let Some(id) = app.current_coin_id() {
            app.toggle_watchlist(&id);
        }
        return Vec::new();
    }

    match route {
        Route::Dashboard if is_search_event(&event) => app.start_search(),
        Route::Watchlist if is_filter_event(&event) => app.start_filter(),
        Route::Watchlist if is_sort_event(&event) => app.cycle_sort(),
        Route::Watchlist if is_sort_order_event(&event) => app.toggle_sort_order(),
        Route::Dashboard | Route::Watchlist if is_up_event(&event) => app.navigate_up(),
        Route::Dashboard | Route::Watchlist if is_down_event(&event) => app.navigate_down(),
        Route::Dashboard | Route::Watchlist if is_enter_event(&event) => {
            return app.open_selected();
        }
        _ if on_detail && (is_escape_event(&event) || is_space_event(&event)) => {
            return app.go_back();
        }
        _ if on_detail && is_next_timeframe_event(&event) => {
            return app.next_timeframe().into_iter().collect();
        }
        _ if on_detail && is_previous_timeframe_event(&event) => {
            return app.previous_timeframe().into_iter().collect();
        }
        _ if on_detail => {
            let timeframe = get_timeframe_index(&event).and_then(|i| ChartTimeframe::all().get(i).copied());
            if let Some(timeframe) = timeframe {
                return app.set_timeframe(timeframe).into_iter().collect();
            }
        }
        _ => {}
    }

    Vec::new()
}

/// Quit en deux temps : première pression = confirmation, seconde = quit
fn confirm_or_quit(app: &mut App) {
    if app.is_awaiting_quit_confirmation() {
        info!("User confirmed quit");
        app.quit();
    } else {
        info!("User requested quit (awaiting confirmation)");
        app.request_quit();
    }
}

/// Flèches seules : en recherche, j et k sont du texte
fn is_arrow_event(event: &Event, up: bool) -> bool {
    use crossterm::event::KeyCode;

    match event {
        Event::Key(key) if up => key.code == KeyCode::Up,
        Event::Key(key) => key.code == KeyCode::Down,
        Event::Tick => false,
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
