// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Les méthodes qui déclenchent des appels réseau retournent des
//    AppCommand : c'est main.rs qui les envoie au worker
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - L'état de session (auth + watchlist) vit dans AppState et ne change que
//   via dispatch()
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{Config, Credentials, DEFAULT_CURRENCY, DEFAULT_PER_PAGE, DEFAULT_SEARCH_DEBOUNCE_MS};
use crate::models::{ChartTimeframe, Coin, CoinDetail, GlobalStats, PriceSeries};
use crate::routes::{resolve, Route};
use crate::search::{accept_query, Debouncer, SearchResults};
use crate::store::auth::check_credentials;
use crate::store::watchlist::{select_rows, SortBy, SortOrder, WatchlistRow};
use crate::store::{AppState, AuthAction, Notice, WatchlistAction};
use crate::worker::{AppCommand, AppResult, LoadTarget};

// ============================================================================
// Formulaire de login
// ============================================================================

/// Champ du formulaire qui a le focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Saisie en cours sur l'écran de login
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub show_password: bool,
    /// Message affiché sous le formulaire après un échec
    pub error: Option<String>,
}

impl LoginForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Tab : passe au champ suivant
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Mot de passe tel qu'affiché (masqué sauf si show_password)
    pub fn password_display(&self) -> String {
        if self.show_password {
            self.password.clone()
        } else {
            "•".repeat(self.password.chars().count())
        }
    }
}

// ============================================================================
// Enum : InputMode
// ============================================================================
// CONCEPT : Modal input (Vim-like)
// - Normal : les touches sont des raccourcis
// - Search : les touches vont dans la barre de recherche (dashboard)
// - Filter : les touches vont dans le filtre local (watchlist)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Filter,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché (toujours passé par resolve())
    pub route: Route,

    /// Écran où revenir en quittant la fiche détail
    pub back_route: Route,

    /// Session : authentification + watchlist
    pub state: AppState,

    /// Devise d'affichage ("usd", "eur", ...)
    pub currency: String,
    pub per_page: u32,
    credentials: Credentials,

    pub login: LoginForm,

    // Dashboard
    pub coins: Vec<Coin>,
    pub global: GlobalStats,
    pub selected_index: usize,

    // Recherche
    pub input_mode: InputMode,
    pub search_input: String,
    debouncer: Debouncer,
    pub search: SearchResults,
    pub search_selected: usize,

    // Watchlist
    /// Lignes de marché chargées pour les ids suivis
    pub watchlist_coins: Vec<Coin>,
    pub watchlist_filter: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub watchlist_selected: usize,

    // Fiche détail
    pub detail: Option<CoinDetail>,
    pub series: PriceSeries,
    pub timeframe: ChartTimeframe,

    /// Dernière notification (remplace les toasts)
    pub notice: Option<Notice>,

    /// Two-step quit : première pression de 'q' arme, la seconde quitte
    pub confirm_quit: bool,

    /// Nombre de commandes en vol dans le worker
    in_flight: usize,
    pub loading_message: Option<String>,
}

impl App {
    /// Crée l'application à partir de la configuration
    pub fn new(config: &Config) -> Self {
        Self::build(
            config.currency.clone(),
            config.per_page,
            config.credentials.clone(),
            config.search_debounce,
        )
    }

    fn build(currency: String, per_page: u32, credentials: Credentials, debounce: Duration) -> Self {
        Self {
            running: true,
            route: Route::Login,
            back_route: Route::Dashboard,
            state: AppState::default(),
            currency,
            per_page,
            credentials,
            login: LoginForm::default(),
            coins: Vec::new(),
            global: GlobalStats::default(),
            selected_index: 0,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            debouncer: Debouncer::new(debounce),
            search: SearchResults::new(),
            search_selected: 0,
            watchlist_coins: Vec::new(),
            watchlist_filter: String::new(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            watchlist_selected: 0,
            detail: None,
            series: PriceSeries::empty("", ChartTimeframe::default()),
            timeframe: ChartTimeframe::default(),
            notice: None,
            confirm_quit: false,
            in_flight: 0,
            loading_message: None,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Le worker exécute plusieurs commandes à la fois : compteur plutôt
    /// que booléen, le message est celui de la dernière commande lancée
    pub fn start_loading(&mut self, message: Option<String>) {
        self.in_flight += 1;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.loading_message = None;
        }
    }

    pub fn is_loading_data(&self) -> bool {
        self.in_flight > 0
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// Déclenche la recherche quand la période calme du debounce est écoulée
    pub fn tick(&mut self, now: Instant) -> Option<AppCommand> {
        let text = self.debouncer.poll(now)?;
        let query = accept_query(&text)?;
        let seq = self.search.begin();
        info!(seq, query = %query, "Issuing debounced search");
        Some(AppCommand::Search { seq, query })
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Change d'écran en appliquant les gardes d'authentification
    ///
    /// Retourne les chargements nécessaires pour l'écran d'arrivée
    pub fn navigate(&mut self, requested: Route) -> Vec<AppCommand> {
        let route = resolve(requested.clone(), self.is_authenticated());
        if route != requested {
            debug!(from = %requested, to = %route, "Navigation redirected");
        }

        if matches!(route, Route::CoinDetail(_)) && !matches!(self.route, Route::CoinDetail(_)) {
            self.back_route = self.route.clone();
        }

        self.route = route.clone();
        self.input_mode = InputMode::Normal;
        self.confirm_quit = false;

        match route {
            Route::Login => Vec::new(),
            Route::Dashboard => vec![self.load_markets(), self.load_global()],
            Route::Watchlist => {
                self.watchlist_selected = 0;
                self.load_watchlist().into_iter().collect()
            }
            Route::CoinDetail(id) => {
                self.detail = None;
                self.series = PriceSeries::empty(&id, self.timeframe);
                vec![
                    AppCommand::LoadCoinDetail {
                        id: id.clone(),
                        currency: self.currency.clone(),
                    },
                    self.load_chart(&id),
                ]
            }
        }
    }

    /// Recharge les données de l'écran courant
    pub fn refresh(&mut self) -> Vec<AppCommand> {
        let route = self.route.clone();
        match route {
            Route::Watchlist => self.load_watchlist().into_iter().collect(),
            other => self.navigate(other),
        }
    }

    /// Quitte la fiche détail vers l'écran d'origine
    pub fn go_back(&mut self) -> Vec<AppCommand> {
        let back = self.back_route.clone();
        self.navigate(back)
    }

    fn load_markets(&self) -> AppCommand {
        AppCommand::LoadMarkets {
            currency: self.currency.clone(),
            page: 1,
            per_page: self.per_page,
        }
    }

    /// Aucun chargement si la watchlist est vide
    fn load_watchlist(&self) -> Option<AppCommand> {
        if self.state.watchlist.is_empty() {
            return None;
        }
        Some(AppCommand::LoadWatchlist {
            ids: self.state.watchlist.ids.clone(),
            currency: self.currency.clone(),
        })
    }

    fn load_global(&self) -> AppCommand {
        AppCommand::LoadGlobal {
            currency: self.currency.clone(),
        }
    }

    fn load_chart(&self, id: &str) -> AppCommand {
        AppCommand::LoadChart {
            id: id.to_string(),
            currency: self.currency.clone(),
            timeframe: self.timeframe,
        }
    }

    // ========================================================================
    // Authentification
    // ========================================================================

    /// Valide le formulaire de login
    pub fn submit_login(&mut self) -> Vec<AppCommand> {
        match check_credentials(&self.login.email, &self.login.password, &self.credentials) {
            Ok(()) => {
                info!("Login succeeded");
                self.notice = self.state.dispatch(AuthAction::Login);
                self.login = LoginForm::default();
                self.navigate(Route::Dashboard)
            }
            Err(e) => {
                warn!(error = %e, "Login rejected");
                self.login.error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn logout(&mut self) -> Vec<AppCommand> {
        info!("User logged out");
        self.notice = self.state.dispatch(AuthAction::Logout);
        self.cancel_search();
        self.navigate(Route::Login)
    }

    // ========================================================================
    // Watchlist
    // ========================================================================

    pub fn toggle_watchlist(&mut self, id: &str) {
        let notice = self.state.dispatch(WatchlistAction::Toggle(id.to_string()));
        info!(coin = %id, in_watchlist = self.is_in_watchlist(id), "Watchlist toggled");
        self.notice = notice;

        // La vue watchlist peut avoir rétréci
        let len = self.watchlist_view().len();
        self.watchlist_selected = self.watchlist_selected.min(len.saturating_sub(1));
    }

    pub fn is_in_watchlist(&self, id: &str) -> bool {
        self.state.watchlist.contains(id)
    }

    /// Lignes de la watchlist, filtrées et triées pour l'écran watchlist
    ///
    /// Un id suivi sans ligne de marché chargée apparaît quand même
    pub fn watchlist_view(&self) -> Vec<WatchlistRow<'_>> {
        select_rows(
            &self.watchlist_coins,
            &self.coins,
            &self.state.watchlist,
            &self.watchlist_filter,
            self.sort_by,
            self.sort_order,
        )
    }

    pub fn cycle_sort(&mut self) {
        self.sort_by = self.sort_by.next();
        self.watchlist_selected = 0;
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggle();
        self.watchlist_selected = 0;
    }

    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    pub fn stop_filter(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn filter_push(&mut self, c: char) {
        self.watchlist_filter.push(c);
        self.watchlist_selected = 0;
    }

    pub fn filter_backspace(&mut self) {
        self.watchlist_filter.pop();
        self.watchlist_selected = 0;
    }

    // ========================================================================
    // Sélection et ouverture
    // ========================================================================

    /// Identifiant sous le curseur de l'écran courant
    pub fn selected_coin_id(&self) -> Option<String> {
        match self.route {
            Route::Dashboard => self.coins.get(self.selected_index).map(|c| c.id.clone()),
            Route::Watchlist => self
                .watchlist_view()
                .get(self.watchlist_selected)
                .map(|row| row.id().to_string()),
            _ => None,
        }
    }

    /// Identifiant du coin concerné par l'écran courant
    pub fn current_coin_id(&self) -> Option<String> {
        match &self.route {
            Route::CoinDetail(id) => Some(id.clone()),
            _ => self.selected_coin_id(),
        }
    }

    /// Saturating arithmetic : ne descend jamais sous 0
    pub fn navigate_up(&mut self) {
        match self.input_mode {
            InputMode::Search => self.search_selected = self.search_selected.saturating_sub(1),
            _ => match self.route {
                Route::Dashboard => self.selected_index = self.selected_index.saturating_sub(1),
                Route::Watchlist => self.watchlist_selected = self.watchlist_selected.saturating_sub(1),
                _ => {}
            },
        }
    }

    pub fn navigate_down(&mut self) {
        match self.input_mode {
            InputMode::Search => {
                let max = self.search.hits().len().saturating_sub(1);
                self.search_selected = (self.search_selected + 1).min(max);
            }
            _ => match self.route {
                Route::Dashboard => {
                    let max = self.coins.len().saturating_sub(1);
                    self.selected_index = (self.selected_index + 1).min(max);
                }
                Route::Watchlist => {
                    let max = self.watchlist_view().len().saturating_sub(1);
                    self.watchlist_selected = (self.watchlist_selected + 1).min(max);
                }
                _ => {}
            },
        }
    }

    /// Ouvre la fiche détail du coin sélectionné
    pub fn open_selected(&mut self) -> Vec<AppCommand> {
        match self.selected_coin_id() {
            Some(id) => self.navigate(Route::CoinDetail(id)),
            None => Vec::new(),
        }
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn is_searching(&self) -> bool {
        self.input_mode == InputMode::Search
    }

    pub fn search_push(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.on_search_input(now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.search_input.pop();
        self.on_search_input(now);
    }

    /// Chaque frappe réarme le debounce ; un texte trop court vide les résultats
    fn on_search_input(&mut self, now: Instant) {
        if accept_query(&self.search_input).is_some() {
            self.debouncer.input(&self.search_input, now);
        } else {
            self.debouncer.cancel();
            self.search.clear();
            self.search_selected = 0;
        }
    }

    /// Ferme la recherche et oublie les requêtes en vol
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
        self.debouncer.cancel();
        self.search.clear();
        self.search_selected = 0;
    }

    /// Ouvre le résultat de recherche sélectionné
    pub fn open_search_hit(&mut self) -> Vec<AppCommand> {
        let id = match self.search.hits().get(self.search_selected) {
            Some(hit) => hit.id.clone(),
            None => return Vec::new(),
        };
        self.cancel_search();
        self.navigate(Route::CoinDetail(id))
    }

    // ========================================================================
    // Fiche détail : timeframe du graphique
    // ========================================================================

    pub fn set_timeframe(&mut self, timeframe: ChartTimeframe) -> Option<AppCommand> {
        let id = match &self.route {
            Route::CoinDetail(id) => id.clone(),
            _ => return None,
        };
        if timeframe == self.timeframe && self.series.coin_id == id {
            return None;
        }
        self.timeframe = timeframe;
        self.series = PriceSeries::empty(&id, timeframe);
        Some(self.load_chart(&id))
    }

    pub fn next_timeframe(&mut self) -> Option<AppCommand> {
        self.set_timeframe(self.timeframe.next())
    }

    pub fn previous_timeframe(&mut self) -> Option<AppCommand> {
        self.set_timeframe(self.timeframe.previous())
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Intègre un résultat du worker dans l'état
    ///
    /// Un échec vide la région concernée (liste vide, "--", graphique vide)
    pub fn apply_result(&mut self, result: AppResult) {
        match result {
            AppResult::MarketsLoaded(coins) => {
                self.coins = coins;
                self.selected_index = self.selected_index.min(self.coins.len().saturating_sub(1));
            }
            AppResult::WatchlistLoaded(coins) => {
                self.watchlist_coins = coins;
                let len = self.watchlist_view().len();
                self.watchlist_selected = self.watchlist_selected.min(len.saturating_sub(1));
            }
            AppResult::GlobalLoaded(stats) => self.global = stats,
            AppResult::CoinDetailLoaded(detail) => {
                if self.route == Route::CoinDetail(detail.id.clone()) {
                    self.detail = Some(detail);
                } else {
                    debug!(coin = %detail.id, "Ignoring detail for a coin no longer displayed");
                }
            }
            AppResult::ChartLoaded(series) => {
                if self.route == Route::CoinDetail(series.coin_id.clone()) && series.timeframe == self.timeframe {
                    self.series = series;
                } else {
                    debug!(coin = %series.coin_id, "Ignoring outdated chart");
                }
            }
            AppResult::SearchCompleted { seq, hits } => {
                if self.search.apply(seq, hits) {
                    self.search_selected = 0;
                }
            }
            AppResult::LoadFailed { target, error } => self.degrade(target, &error),
        }
    }

    /// Vide la région concernée et affiche l'erreur
    ///
    /// Un échec tardif (recherche périmée, coin ou timeframe qui n'est plus
    /// affiché) ne touche à rien et ne produit pas de notice
    fn degrade(&mut self, target: LoadTarget, error: &str) {
        let (degraded, message) = match &target {
            LoadTarget::Markets => {
                self.coins.clear();
                self.selected_index = 0;
                (true, "Failed to load markets")
            }
            LoadTarget::Watchlist => {
                self.watchlist_coins.clear();
                (true, "Failed to load watchlist")
            }
            LoadTarget::Global => {
                self.global = GlobalStats::default();
                (true, "Failed to load global stats")
            }
            LoadTarget::CoinDetail { id } => {
                let shown = self.route == Route::CoinDetail(id.clone());
                if shown {
                    self.detail = None;
                }
                (shown, "Failed to load coin details")
            }
            LoadTarget::Chart { id, timeframe } => {
                let shown = self.route == Route::CoinDetail(id.clone()) && *timeframe == self.timeframe;
                if shown {
                    self.series = PriceSeries::empty(id, *timeframe);
                }
                (shown, "Failed to load chart")
            }
            LoadTarget::Search { seq } => (self.search.apply(*seq, Vec::new()), "Search failed"),
        };

        if degraded {
            self.notice = Some(Notice::error(format!("{}: {}", message, error)));
        } else {
            debug!(?target, error = %error, "Ignoring failure for a region no longer displayed");
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::build(
            DEFAULT_CURRENCY.to_string(),
            DEFAULT_PER_PAGE,
            Credentials {
                email: String::new(),
                password: String::new(),
            },
            Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        )
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
