// ============================================================================
// Background Worker
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker thread
// - Le worker exécute les appels async sur son propre runtime tokio
// - Chaque commande devient une tâche locale (LocalSet) : un graphique lent
//   ne retarde pas une recherche
// - Les AppResult reviennent par un second channel (std mpsc)
//
// Aucune requête n'est coordonnée avec une autre : l'ordre d'arrivée n'est
// pas garanti. Les recherches portent un numéro de séquence pour que l'UI
// ignore les réponses périmées.
// ============================================================================

use std::rc::Rc;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::LocalSet;
use tracing::{error, info};

use crate::api::MarketSource;
use crate::app::App;
use crate::models::{ChartTimeframe, Coin, CoinDetail, GlobalStats, PriceSeries, SearchHit};

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    LoadMarkets {
        currency: String,
        page: u32,
        per_page: u32,
    },
    /// Lignes de marché des coins suivis (ids dans l'ordre de la watchlist)
    LoadWatchlist {
        ids: Vec<String>,
        currency: String,
    },
    LoadGlobal {
        currency: String,
    },
    LoadCoinDetail {
        id: String,
        currency: String,
    },
    LoadChart {
        id: String,
        currency: String,
        timeframe: ChartTimeframe,
    },
    /// Recherche distante, `seq` vient de SearchResults::begin()
    Search {
        seq: u64,
        query: String,
    },
}

impl AppCommand {
    /// Message affiché pendant le chargement
    pub fn loading_message(&self) -> String {
        match self {
            AppCommand::LoadMarkets { .. } => "Loading markets...".to_string(),
            AppCommand::LoadWatchlist { .. } => "Loading watchlist...".to_string(),
            AppCommand::LoadGlobal { .. } => "Loading global stats...".to_string(),
            AppCommand::LoadCoinDetail { id, .. } => format!("Loading {}...", id),
            AppCommand::LoadChart { id, timeframe, .. } => {
                format!("Loading {} chart ({})...", id, timeframe.label())
            }
            AppCommand::Search { query, .. } => format!("Searching \"{}\"...", query),
        }
    }
}

/// Région de l'écran concernée par un échec
///
/// L'UI s'en sert pour remplacer la région par un état vide
#[derive(Debug, Clone, PartialEq)]
pub enum LoadTarget {
    Markets,
    Watchlist,
    Global,
    CoinDetail { id: String },
    Chart { id: String, timeframe: ChartTimeframe },
    Search { seq: u64 },
}

/// Résultats renvoyés par le worker
#[derive(Debug, Clone, PartialEq)]
pub enum AppResult {
    MarketsLoaded(Vec<Coin>),
    WatchlistLoaded(Vec<Coin>),
    GlobalLoaded(GlobalStats),
    CoinDetailLoaded(CoinDetail),
    ChartLoaded(PriceSeries),
    SearchCompleted { seq: u64, hits: Vec<SearchHit> },
    LoadFailed { target: LoadTarget, error: String },
}

/// Exécute une commande sur une source de données
///
/// Toute erreur est loggée puis convertie en LoadFailed : le worker ne
/// s'arrête jamais sur un échec réseau
pub async fn execute<S: MarketSource>(source: &S, command: AppCommand) -> AppResult {
    match command {
        AppCommand::LoadMarkets {
            currency,
            page,
            per_page,
        } => match source.top_coins(&currency, page, per_page).await {
            Ok(coins) => AppResult::MarketsLoaded(coins),
            Err(e) => failed(LoadTarget::Markets, e),
        },

        AppCommand::LoadWatchlist { ids, currency } => match source.coins_by_ids(&ids, &currency).await {
            Ok(coins) => AppResult::WatchlistLoaded(coins),
            Err(e) => failed(LoadTarget::Watchlist, e),
        },

        AppCommand::LoadGlobal { currency } => match source.global_stats(&currency).await {
            Ok(stats) => AppResult::GlobalLoaded(stats),
            Err(e) => failed(LoadTarget::Global, e),
        },

        AppCommand::LoadCoinDetail { id, currency } => {
            match source.coin_details(&id, &currency).await {
                Ok(detail) => AppResult::CoinDetailLoaded(detail),
                Err(e) => failed(LoadTarget::CoinDetail { id }, e),
            }
        }

        AppCommand::LoadChart {
            id,
            currency,
            timeframe,
        } => match source.market_chart(&id, &currency, timeframe).await {
            Ok(series) => AppResult::ChartLoaded(series),
            Err(e) => failed(LoadTarget::Chart { id, timeframe }, e),
        },

        AppCommand::Search { seq, query } => match source.search(&query).await {
            Ok(hits) => AppResult::SearchCompleted { seq, hits },
            Err(e) => failed(LoadTarget::Search { seq }, e),
        },
    }
}

fn failed(target: LoadTarget, e: impl std::fmt::Display) -> AppResult {
    error!(?target, error = %e, "Worker command failed");
    AppResult::LoadFailed {
        target,
        error: e.to_string(),
    }
}

fn lock(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - Le runtime est créé ici (erreur propagée à l'appelant)
/// - Il est ensuite déplacé dans le thread (move closure)
/// - Les futures de MarketSource ne sont pas Send : spawn_local sur un
///   LocalSet au lieu de tokio::spawn, la source est partagée via Rc
/// - Le channel de commandes est celui de tokio : send() reste synchrone
///   côté UI, recv().await côté worker
pub fn spawn_worker<S>(
    source: S,
    mut command_rx: UnboundedReceiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) -> std::io::Result<JoinHandle<()>>
where
    S: MarketSource + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let handle = std::thread::Builder::new()
        .name("coinwatch-worker".to_string())
        .spawn(move || {
            let source = Rc::new(source);
            let local = LocalSet::new();

            // Channel fermé : l'UI s'est arrêtée, on sort
            local.block_on(&runtime, async {
                while let Some(command) = command_rx.recv().await {
                    info!(?command, "Worker received command");
                    lock(&app).start_loading(Some(command.loading_message()));

                    let source = Rc::clone(&source);
                    let app = Arc::clone(&app);
                    let result_tx = result_tx.clone();
                    tokio::task::spawn_local(async move {
                        let result = execute(source.as_ref(), command).await;
                        lock(&app).stop_loading();
                        if result_tx.send(result).is_err() {
                            info!("Result channel closed, dropping result");
                        }
                    });
                }
            });

            // Requêtes encore en vol
            runtime.block_on(local);
            info!("Worker thread exiting (channel closed)");
        })?;

    Ok(handle)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ApiError;
    use tokio::sync::mpsc::unbounded_channel;

    /// Source en mémoire : détail et stats globales échouent,
    /// le graphique de "slow" répond après 200 ms
    struct FakeSource;

    fn coin(id: &str) -> Coin {
        Coin {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            image: String::new(),
            current_price: 1.0,
            market_cap: 0.0,
            total_volume: 0.0,
            market_cap_rank: None,
            price_change_percentage_24h: None,
        }
    }

    impl MarketSource for FakeSource {
        async fn top_coins(&self, _currency: &str, _page: u32, per_page: u32) -> Result<Vec<Coin>, ApiError> {
            Ok((0..per_page).map(|i| coin(&format!("coin-{}", i))).collect())
        }

        async fn coins_by_ids(&self, ids: &[String], _currency: &str) -> Result<Vec<Coin>, ApiError> {
            // "unknown" n'existe pas côté API : pas de ligne
            Ok(ids.iter().filter(|id| id.as_str() != "unknown").map(|id| coin(id)).collect())
        }

        async fn coin_details(&self, id: &str, _currency: &str) -> Result<CoinDetail, ApiError> {
            Err(ApiError::Status {
                status: 404,
                body: format!("coin {} not found", id),
            })
        }

        async fn market_chart(
            &self,
            id: &str,
            _currency: &str,
            timeframe: ChartTimeframe,
        ) -> Result<PriceSeries, ApiError> {
            if id == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(PriceSeries::from_prices(id, timeframe, &[(1_705_327_500_000.0, 10.0)]))
        }

        async fn global_stats(&self, _currency: &str) -> Result<GlobalStats, ApiError> {
            Err(ApiError::EmptyPayload("global".to_string()))
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
            Ok(vec![SearchHit {
                id: query.to_string(),
                name: query.to_string(),
                api_symbol: query.to_string(),
                symbol: query.to_string(),
                market_cap_rank: Some(1),
                thumb: String::new(),
                large: String::new(),
            }])
        }
    }

    #[tokio::test]
    async fn test_execute_success_paths() {
        let result = execute(
            &FakeSource,
            AppCommand::LoadMarkets {
                currency: "usd".into(),
                page: 1,
                per_page: 3,
            },
        )
        .await;
        assert!(matches!(result, AppResult::MarketsLoaded(ref coins) if coins.len() == 3));

        let result = execute(&FakeSource, AppCommand::Search { seq: 7, query: "bitcoin".into() }).await;
        match result {
            AppResult::SearchCompleted { seq, hits } => {
                assert_eq!(seq, 7);
                assert_eq!(hits[0].id, "bitcoin");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let result = execute(
            &FakeSource,
            AppCommand::LoadChart {
                id: "bitcoin".into(),
                currency: "usd".into(),
                timeframe: ChartTimeframe::SevenDays,
            },
        )
        .await;
        assert!(matches!(result, AppResult::ChartLoaded(ref s) if s.timeframe == ChartTimeframe::SevenDays));

        let result = execute(
            &FakeSource,
            AppCommand::LoadWatchlist {
                ids: vec!["pepe".into(), "unknown".into()],
                currency: "usd".into(),
            },
        )
        .await;
        assert!(matches!(result, AppResult::WatchlistLoaded(ref coins) if coins.len() == 1 && coins[0].id == "pepe"));
    }

    #[tokio::test]
    async fn test_execute_errors_become_load_failed() {
        let result = execute(
            &FakeSource,
            AppCommand::LoadCoinDetail {
                id: "nope".into(),
                currency: "usd".into(),
            },
        )
        .await;
        assert_eq!(
            result,
            AppResult::LoadFailed {
                target: LoadTarget::CoinDetail { id: "nope".into() },
                error: "HTTP 404: coin nope not found".into(),
            }
        );

        let result = execute(&FakeSource, AppCommand::LoadGlobal { currency: "usd".into() }).await;
        assert!(matches!(
            result,
            AppResult::LoadFailed {
                target: LoadTarget::Global,
                ..
            }
        ));
    }

    #[test]
    fn test_worker_thread_round_trip() {
        let app = Arc::new(Mutex::new(App::default()));
        let (command_tx, command_rx) = unbounded_channel();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = spawn_worker(FakeSource, command_rx, result_tx, app.clone()).unwrap();
        command_tx
            .send(AppCommand::Search {
                seq: 1,
                query: "eth".into(),
            })
            .unwrap();

        let result = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, AppResult::SearchCompleted { seq: 1, .. }));

        drop(command_tx);
        handle.join().unwrap();
        assert!(!app.lock().unwrap().is_loading_data());
    }

    #[test]
    fn test_slow_chart_does_not_delay_search() {
        let app = Arc::new(Mutex::new(App::default()));
        let (command_tx, command_rx) = unbounded_channel();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = spawn_worker(FakeSource, command_rx, result_tx, app.clone()).unwrap();
        command_tx
            .send(AppCommand::LoadChart {
                id: "slow".into(),
                currency: "usd".into(),
                timeframe: ChartTimeframe::OneDay,
            })
            .unwrap();
        command_tx
            .send(AppCommand::Search {
                seq: 3,
                query: "sol".into(),
            })
            .unwrap();

        let first = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(first, AppResult::SearchCompleted { seq: 3, .. }));

        let second = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(second, AppResult::ChartLoaded(ref s) if s.coin_id == "slow"));

        drop(command_tx);
        handle.join().unwrap();
        assert!(!app.lock().unwrap().is_loading_data());
    }

    #[test]
    fn test_pending_commands_finish_after_channel_closes() {
        let app = Arc::new(Mutex::new(App::default()));
        let (command_tx, command_rx) = unbounded_channel();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = spawn_worker(FakeSource, command_rx, result_tx, app).unwrap();
        command_tx
            .send(AppCommand::LoadChart {
                id: "slow".into(),
                currency: "usd".into(),
                timeframe: ChartTimeframe::OneDay,
            })
            .unwrap();
        drop(command_tx);
        handle.join().unwrap();

        let result = result_rx.try_recv().unwrap();
        assert!(matches!(result, AppResult::ChartLoaded(_)));
    }
}
