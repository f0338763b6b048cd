//! Real-time chat room server with an in-room assistant.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;

use parlor_server::{
    domain::{ConnectionRegistry, RoomRoster},
    infrastructure::{
        generation::OpenAiTextGenerator, pusher::WebSocketEventPusher,
        repository::InMemoryChatStore, verifier::JwtTokenVerifier,
    },
    ui::Server,
    usecase::{
        AgentCoordinator, CheckRoomUseCase, ConnectSessionUseCase, CreateRoomUseCase,
        DisconnectSessionUseCase, JoinRoomUseCase, LeaveRoomUseCase, MemoryExtractor,
        MemoryStore, SendMessageUseCase,
    },
};
use parlor_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "Real-time chat room server with an in-room assistant", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let secret = std::env::var("PARLOR_SECRET").unwrap_or_else(|_| {
        tracing::warn!("PARLOR_SECRET is not set; using an insecure development secret");
        "parlor-dev-secret".to_string()
    });

    // Initialize dependencies in order:
    // 1. Store, verifier, generator
    // 2. Session state and pusher
    // 3. Assistant coordinator and memory extractor
    // 4. UseCases
    // 5. Server

    // 1. Collaborators
    let store = Arc::new(InMemoryChatStore::new(Arc::new(SystemClock)));
    let verifier = Arc::new(JwtTokenVerifier::new(&secret));
    let generator = Arc::new(OpenAiTextGenerator::from_env());

    // 2. Session state and pusher
    let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
    let roster = Arc::new(Mutex::new(RoomRoster::new()));
    let pusher = Arc::new(WebSocketEventPusher::new());

    // 3. Assistant coordinator and memory extractor
    let agent = Arc::new(AgentCoordinator::new(
        store.clone(),
        roster.clone(),
        pusher.clone(),
        generator.clone(),
    ));
    let memory = Arc::new(MemoryStore::new());
    let extractor = Arc::new(MemoryExtractor::new(generator, memory.clone()));

    // 4. UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        verifier,
        registry.clone(),
        pusher.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        roster.clone(),
        store.clone(),
        pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        roster.clone(),
        store.clone(),
        pusher.clone(),
        agent,
        extractor,
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        registry.clone(),
        roster.clone(),
        store.clone(),
        pusher.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry,
        roster,
        pusher,
    ));
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(store.clone()));
    let check_room_usecase = Arc::new(CheckRoomUseCase::new(store));

    // 5. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        join_room_usecase,
        send_message_usecase,
        leave_room_usecase,
        disconnect_session_usecase,
        create_room_usecase,
        check_room_usecase,
        memory,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
