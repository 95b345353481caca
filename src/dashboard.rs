use crate::api::models::Conversation;
use crate::app::{ClientContext, ConnectionConfig};
use crate::board::{Board, NewBoard};
use crate::error::Result;
use crate::storage::BoardSubscription;
use crate::sync::{ConversationSync, SYNC_INTERVAL};
use crate::utils::run_async_to_main;
use crate::view_model::{KanbanView, group_by_columns};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum Command {
    Refresh,
    /// One-based position in the board list.
    Select(usize),
    CreateBoard(NewBoard),
    DeleteActive,
    Configure(ConnectionConfig),
    Quit,
}

#[derive(Debug)]
pub enum DashboardEvent {
    Boards(Vec<Board>),
    Fetched {
        generation: u64,
        result: Result<Vec<Conversation>>,
    },
    Tick,
    Command(Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Dashboard {
    ctx: ClientContext,
    config: Option<ConnectionConfig>,
    boards: Vec<Board>,
    active: Option<String>,
    conversations: Vec<Conversation>,
    sync: ConversationSync,
}

impl Dashboard {
    pub fn new(ctx: ClientContext) -> Self {
        let config = ctx.load_settings();
        Self {
            ctx,
            config,
            boards: Vec::new(),
            active: None,
            conversations: Vec::new(),
            sync: ConversationSync::default(),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }

    pub fn config(&self) -> Option<&ConnectionConfig> {
        self.config.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.config.as_ref().is_some_and(ConnectionConfig::is_complete)
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn active_board(&self) -> Option<&Board> {
        let id = self.active.as_deref()?;
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    /// Conversations grouped under the active board's columns.
    pub fn kanban(&self) -> KanbanView<'_> {
        match self.active_board() {
            Some(board) => group_by_columns(board.columns.as_slice(), &self.conversations),
            None => KanbanView::default(),
        }
    }

    /// Open the live board subscription. Without an identity there is none.
    pub fn subscribe(&mut self) -> Option<BoardSubscription> {
        if self.ctx.identity.is_none() {
            log::warn!("no identity; board list unavailable");
            return None;
        }
        match self.ctx.boards.subscribe(&self.ctx.namespace()) {
            Ok(mut rx) => {
                let snapshot = rx.borrow_and_update().clone();
                self.apply_boards(snapshot);
                Some(rx)
            }
            Err(e) => {
                log::error!("board subscription failed: {}", e);
                None
            }
        }
    }

    /// Replace the board list. A selection that no longer exists falls back
    /// to the first board, or to nothing when the list is empty.
    pub fn apply_boards(&mut self, boards: Vec<Board>) {
        self.boards = boards;
        let still_there = self
            .active
            .as_deref()
            .is_some_and(|id| self.boards.iter().any(|b| b.id == id));
        if !still_there {
            self.active = self.boards.first().map(|b| b.id.clone());
        }
    }

    pub fn select_id(&mut self, id: &str) -> bool {
        if self.boards.iter().any(|b| b.id == id) {
            self.active = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn select(&mut self, position: usize) -> bool {
        match position.checked_sub(1).and_then(|i| self.boards.get(i)) {
            Some(board) => {
                self.active = Some(board.id.clone());
                true
            }
            None => {
                log::warn!("no board at position {}", position);
                false
            }
        }
    }

    /// Start a fetch whose result comes back as [`DashboardEvent::Fetched`].
    pub fn request_sync(&mut self, tx: &mpsc::UnboundedSender<DashboardEvent>) -> Option<u64> {
        let config = self.config.clone()?;
        let generation = self.sync.begin(Some(&config))?;
        let api = self.ctx.api.clone();
        run_async_to_main(
            async move {
                let result = api.conversations(&config).await;
                DashboardEvent::Fetched { generation, result }
            },
            tx.clone(),
        );
        Some(generation)
    }

    pub fn create_board(&mut self, board: &NewBoard) -> Option<Board> {
        if self.ctx.identity.is_none() {
            log::warn!("cannot create board '{}' without an identity", board.name());
            return None;
        }
        match self.ctx.boards.create(&self.ctx.namespace(), board) {
            Ok(created) => {
                log::info!("created board '{}' ({})", created.name, created.id);
                if self.active.is_none() {
                    self.active = Some(created.id.clone());
                }
                Some(created)
            }
            Err(e) => {
                log::error!("could not create board '{}': {}", board.name(), e);
                None
            }
        }
    }

    pub fn delete_board(&mut self, id: &str) {
        if self.ctx.identity.is_none() {
            log::warn!("cannot delete board {} without an identity", id);
            return;
        }
        if let Err(e) = self.ctx.boards.delete(&self.ctx.namespace(), id) {
            log::error!("could not delete board {}: {}", id, e);
            return;
        }
        let remaining: Vec<Board> = self.boards.iter().filter(|b| b.id != id).cloned().collect();
        self.apply_boards(remaining);
    }

    pub fn configure(&mut self, config: ConnectionConfig, tx: &mpsc::UnboundedSender<DashboardEvent>) {
        if let Err(e) = self.ctx.save_settings(&config) {
            log::error!("could not save settings: {}", e);
        }
        self.config = Some(config);
        self.request_sync(tx);
    }

    pub fn handle(&mut self, event: DashboardEvent, tx: &mpsc::UnboundedSender<DashboardEvent>) -> Flow {
        match event {
            DashboardEvent::Boards(boards) => self.apply_boards(boards),
            DashboardEvent::Fetched { generation, result } => {
                self.sync.finish(generation, result, &mut self.conversations);
            }
            DashboardEvent::Tick => {
                self.request_sync(tx);
            }
            DashboardEvent::Command(cmd) => match cmd {
                Command::Refresh => {
                    self.request_sync(tx);
                }
                Command::Select(position) => {
                    self.select(position);
                }
                Command::CreateBoard(board) => {
                    self.create_board(&board);
                }
                Command::DeleteActive => match self.active.clone() {
                    Some(id) => self.delete_board(&id),
                    None => log::warn!("no board selected"),
                },
                Command::Configure(config) => self.configure(config, tx),
                Command::Quit => return Flow::Quit,
            },
        }
        Flow::Continue
    }
}

async fn next_boards(rx: &mut Option<BoardSubscription>) -> Option<Vec<Board>> {
    match rx {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(rx.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

/// Drive the dashboard until a quit command arrives or input closes.
/// `render` runs after startup and after every handled event.
pub async fn run<F>(mut dashboard: Dashboard, mut commands: mpsc::UnboundedReceiver<Command>, mut render: F)
where
    F: FnMut(&Dashboard),
{
    let (tx, mut rx) = mpsc::unbounded_channel::<DashboardEvent>();
    let mut boards = dashboard.subscribe();
    dashboard.request_sync(&tx);
    let start = tokio::time::Instant::now() + SYNC_INTERVAL;
    let mut interval = tokio::time::interval_at(start, SYNC_INTERVAL);
    render(&dashboard);

    loop {
        let event = tokio::select! {
            Some(event) = rx.recv() => event,
            changed = next_boards(&mut boards) => match changed {
                Some(list) => DashboardEvent::Boards(list),
                None => {
                    log::warn!("board subscription closed");
                    boards = None;
                    continue;
                }
            },
            _ = interval.tick() => DashboardEvent::Tick,
            cmd = commands.recv() => DashboardEvent::Command(cmd.unwrap_or(Command::Quit)),
        };
        if dashboard.handle(event, &tx) == Flow::Quit {
            break;
        }
        render(&dashboard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiClient;
    use crate::api::models::conversation;
    use crate::app::RuntimeConfig;
    use crate::identity::{Identity, IdentityProvider, LocalIdentityProvider};
    use crate::storage::{BoardStore, SqliteBoardStore};
    use std::sync::Arc;

    struct Rejecting;

    impl IdentityProvider for Rejecting {
        fn sign_in_with_custom_token(&self, _token: &str) -> Result<Identity> {
            Err(crate::error::Error::InvalidCredential("rejected".into()))
        }
        fn sign_in_anonymously(&self) -> Result<Identity> {
            Err(crate::error::Error::InvalidCredential("rejected".into()))
        }
    }

    fn context(dir: &tempfile::TempDir, provider: &dyn IdentityProvider) -> ClientContext {
        let store: Arc<dyn BoardStore> = Arc::new(SqliteBoardStore::open_in_memory().unwrap());
        ClientContext::new(
            RuntimeConfig::default(),
            provider,
            store,
            ApiClient::new().unwrap(),
            dir.path().join("settings.json"),
        )
    }

    fn new_board(name: &str, columns: &[&str]) -> NewBoard {
        NewBoard::new(name, columns).unwrap()
    }

    #[test]
    fn first_snapshot_selects_first_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        dash.create_board(&new_board("Sales", &["new"]));
        dash.create_board(&new_board("Support", &["open"]));
        let rx = dash.subscribe();
        assert!(rx.is_some());
        assert_eq!(dash.boards().len(), 2);
        assert_eq!(dash.active_board().map(|b| b.name.as_str()), Some("Sales"));
    }

    #[test]
    fn snapshot_keeps_existing_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        dash.create_board(&new_board("A", &["x"]));
        dash.create_board(&new_board("B", &["y"]));
        dash.subscribe();
        assert!(dash.select(2));
        let boards = dash.boards().to_vec();
        dash.apply_boards(boards);
        assert_eq!(dash.active_board().map(|b| b.name.as_str()), Some("B"));
        assert!(!dash.select(0));
        assert!(!dash.select(3));
        let first = dash.boards()[0].id.clone();
        assert!(dash.select_id(&first));
        assert_eq!(dash.active_board().map(|b| b.name.as_str()), Some("A"));
        assert!(!dash.select_id("missing"));
    }

    #[test]
    fn deleting_active_board_reselects_first_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        dash.create_board(&new_board("A", &["x"]));
        dash.create_board(&new_board("B", &["y"]));
        dash.subscribe();
        dash.select(2);

        let (tx, _rx) = mpsc::unbounded_channel();
        dash.handle(DashboardEvent::Command(Command::DeleteActive), &tx);
        assert_eq!(dash.active_board().map(|b| b.name.as_str()), Some("A"));

        dash.handle(DashboardEvent::Command(Command::DeleteActive), &tx);
        assert!(dash.active_board().is_none());
        assert!(dash.boards().is_empty());
        assert!(dash.kanban().is_empty());
    }

    #[test]
    fn no_identity_withholds_boards() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &Rejecting));
        assert!(dash.subscribe().is_none());
        assert!(dash.create_board(&new_board("A", &["x"])).is_none());
        assert!(dash.boards().is_empty());
    }

    #[test]
    fn unconfigured_dashboard_never_syncs() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        assert!(!dash.is_configured());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(dash.request_sync(&tx), None);
        assert!(!dash.is_loading());
    }

    #[test]
    fn fetched_conversations_fill_active_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        dash.create_board(&new_board("Flow", &["todo", "done"]));
        dash.subscribe();

        let (tx, _rx) = mpsc::unbounded_channel();
        let generation = dash.sync.begin(Some(&ConnectionConfig {
            base_url: "https://cw".into(),
            api_token: "t".into(),
            account_id: "1".into(),
        }));
        let convs = vec![
            conversation(1, &["todo"]),
            conversation(2, &["done", "todo"]),
            conversation(3, &[]),
        ];
        dash.handle(
            DashboardEvent::Fetched {
                generation: generation.unwrap(),
                result: Ok(convs),
            },
            &tx,
        );
        let view = dash.kanban();
        let ids = |c: &str| view.bucket(c).unwrap().iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids("todo"), [1, 2]);
        assert_eq!(ids("done"), [2]);
    }

    #[tokio::test]
    async fn configure_persists_settings_and_starts_sync() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = ConnectionConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_token: "t".into(),
            account_id: "1".into(),
        };
        dash.handle(DashboardEvent::Command(Command::Configure(config.clone())), &tx);
        assert!(dash.is_configured());
        assert!(dash.is_loading());
        assert_eq!(dash.context().load_settings(), Some(config));

        // A manual refresh supersedes the fetch started by configuring.
        dash.handle(DashboardEvent::Command(Command::Refresh), &tx);
        dash.handle(DashboardEvent::Fetched { generation: 2, result: Ok(vec![conversation(4, &[])]) }, &tx);
        assert!(!dash.is_loading());
        assert_eq!(dash.conversations().len(), 1);

        // Both real fetches hit a closed port. The first is superseded and the
        // second was already applied, so neither changes anything.
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, DashboardEvent::Fetched { generation: 1 | 2, result: Err(_) }));
            dash.handle(event, &tx);
            assert_eq!(dash.conversations().len(), 1);
            assert!(!dash.is_loading());
        }
    }

    #[tokio::test]
    async fn run_exits_when_input_closes() {
        let dir = tempfile::tempdir().unwrap();
        let dash = Dashboard::new(context(&dir, &LocalIdentityProvider));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        cmd_tx.send(Command::Refresh).unwrap();
        drop(cmd_tx);
        let mut renders = 0;
        run(dash, cmd_rx, |_| renders += 1).await;
        assert!(renders >= 2);
    }
}
