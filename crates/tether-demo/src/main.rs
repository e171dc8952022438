//! Headless demo: one authoritative timeline replicating a grabbed object to
//! two observers over a simulated lossy, reordering channel.
//!
//! Run with `cargo run -p tether-demo` for defaults, or override the channel:
//! `cargo run -p tether-demo -- --ticks 1200 --drop-rate 0.3 --seed 7`.
//!
//! The scenario drives the full engagement lifecycle: a participant grabs the
//! object mid-run (switching replication to the fast cadence and migrating
//! ownership), a second participant is refused by the exclusive policy, and
//! release returns ownership to the host. Final convergence error and the
//! stale-discard / arbitration-miss counters are logged at the end.

use std::path::PathBuf;

use clap::Parser;
use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tether_config::Config;
use tether_interact::{
    EngagePolicy, Interactable, InteractableKind, InteractionEvent, InteractionRegistry,
    SelectMode, SessionManager, TaskQueue,
};
use tether_sync::{
    ObjectId, ObjectTransform, OwnerId, OwnershipLedger, SnapshotAuthority, SnapshotObserver,
    SyncMessage, decode_message, encode_message,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Lossy-channel replication and interaction demo")]
struct Args {
    /// Simulation steps to run (60 per simulated second).
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Probability an unreliable packet is dropped outright.
    #[arg(long, default_value_t = 0.2)]
    drop_rate: f64,

    /// RNG seed for reproducible loss/reordering patterns.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory holding tether.ron (defaults stay in memory when omitted).
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

/// Unreliable in-memory link: drops packets and delivers survivors after a
/// random 0-4 tick delay, which reorders bursts.
struct LossyChannel {
    rng: Xoshiro256StarStar,
    drop_rate: f64,
    in_flight: Vec<(u64, Vec<u8>)>,
    dropped: u64,
}

impl LossyChannel {
    fn new(seed: u64, drop_rate: f64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            drop_rate,
            in_flight: Vec::new(),
            dropped: 0,
        }
    }

    fn send(&mut self, now: u64, bytes: Vec<u8>) {
        if self.rng.gen_bool(self.drop_rate) {
            self.dropped += 1;
            return;
        }
        let deliver_at = now + self.rng.gen_range(0..5);
        self.in_flight.push((deliver_at, bytes));
    }

    fn drain(&mut self, now: u64) -> Vec<Vec<u8>> {
        let mut due = Vec::new();
        self.in_flight.retain(|(deliver_at, bytes)| {
            if *deliver_at <= now {
                due.push(bytes.clone());
                false
            } else {
                true
            }
        });
        due
    }
}

const DT: f32 = 1.0 / 60.0;
const HOST: OwnerId = OwnerId(0);

fn main() {
    let args = Args::parse();

    let config = match &args.config_dir {
        Some(dir) => match Config::load_or_create(dir) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config: {err}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    tether_log::init_logging(Some(&config));

    info!(
        ticks = args.ticks,
        drop_rate = args.drop_rate,
        seed = args.seed,
        "starting demo"
    );

    // Authoritative world: one object orbiting the origin.
    let object = ObjectId(1);
    let initial = ObjectTransform::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY);
    let mut authority = SnapshotAuthority::new(&config.sync, &initial);
    let mut observers = [
        SnapshotObserver::new(&config.sync, &initial, config.debug.disable_interpolation),
        SnapshotObserver::new(&config.sync, &initial, config.debug.disable_interpolation),
    ];
    let mut remote_ledger = OwnershipLedger::new(HOST);
    let mut channel = LossyChannel::new(args.seed, args.drop_rate);

    // Interaction side: one exclusive grab handle on the object.
    let mut registry = InteractionRegistry::new();
    let handle = registry.insert(
        Interactable::new(1, EngagePolicy::Exclusive, InteractableKind::Grab).with_object(object),
    );
    let mut sessions = SessionManager::new();
    let mut ledger = OwnershipLedger::new(HOST);
    let mut tasks = TaskQueue::new();
    let grabber = sessions.create(true, false);
    let bystander = sessions.create(false, false);
    let mut events = Vec::new();

    let grab_tick = args.ticks / 4;
    let release_tick = args.ticks * 3 / 4;
    let mut live = initial;

    for tick in 0..args.ticks {
        // Scripted inputs.
        if tick == grab_tick {
            let engaged = sessions.request_engage(
                grabber,
                &mut registry,
                &mut ledger,
                &mut tasks,
                &[handle],
                1,
                SelectMode::Equal,
                &config.arbiter,
                &mut events,
            );
            info!(?engaged, "grab request");

            // The exclusive policy refuses a second holder.
            let refused = sessions.request_engage(
                bystander,
                &mut registry,
                &mut ledger,
                &mut tasks,
                &[handle],
                1,
                SelectMode::Equal,
                &config.arbiter,
                &mut events,
            );
            info!(?refused, "bystander request (expected miss)");
        }
        if tick == release_tick {
            let released = sessions.request_disengage(
                grabber,
                &mut registry,
                &mut ledger,
                &[handle],
                1,
                SelectMode::Equal,
                &config.arbiter,
                &mut events,
            );
            info!(?released, "release request");
        }
        sessions.run_deferred(DT, &mut tasks, &mut registry, &mut ledger, &mut events);

        // Engagement transitions feed the replication cadence and travel to
        // observers over the reliable path (delivered directly here).
        for event in events.drain(..) {
            match event {
                InteractionEvent::EngageStarted { participant, .. } => {
                    authority.set_interacted(true);
                    apply_reliable(
                        &SyncMessage::EngageStarted {
                            object,
                            peer: participant.owner_id(),
                        },
                        &mut remote_ledger,
                    );
                }
                InteractionEvent::EngageEnded {
                    target,
                    participant,
                } => {
                    if registry.active_count(target) == 0 {
                        authority.set_interacted(false);
                    }
                    apply_reliable(
                        &SyncMessage::EngageEnded {
                            object,
                            peer: participant.owner_id(),
                        },
                        &mut remote_ledger,
                    );
                }
                InteractionEvent::HoverChanged { .. } => {}
            }
        }

        // Advance the authoritative object along its orbit.
        let angle = tick as f32 * DT * 0.8;
        live.location = Vec3::new(angle.cos() * 2.0, 0.0, angle.sin() * 2.0);
        live.rotation = Quat::from_rotation_y(angle);
        let speed = 0.8 * 2.0;

        if let Some(snapshot) = authority.tick(&live, speed, DT) {
            match encode_message(&SyncMessage::Snapshot { object, snapshot }) {
                Ok(bytes) => channel.send(tick, bytes),
                Err(err) => warn!(%err, "snapshot encode failed"),
            }
        }

        // Observer side: decode whatever the channel delivered this tick.
        for bytes in channel.drain(tick) {
            let message = match decode_message(&bytes) {
                Ok(message) => message,
                Err(err) => {
                    warn!(%err, "dropping undecodable packet");
                    continue;
                }
            };
            if let SyncMessage::Snapshot { snapshot, .. } = message {
                for observer in &mut observers {
                    observer.receive(snapshot);
                }
            }
        }
        for observer in &mut observers {
            observer.tick(DT);
        }
    }

    for (index, observer) in observers.iter().enumerate() {
        let error = (observer.active().location - live.location).length();
        info!(
            observer = index,
            convergence_error = error,
            stale_discards = observer.stale_discards(),
            latest_sequence = observer.latest().map(|s| s.sequence),
            "observer summary"
        );
    }
    info!(
        packets_dropped = channel.dropped,
        authority_sequence = authority.sequence(),
        ownership_transfers = ledger.transferred_count(),
        remote_owner = ?remote_ledger.owner_of(object),
        bystander_misses = sessions.get(bystander).map(|s| s.arbitration_misses()),
        "demo complete"
    );
}

/// Applies a reliable-path lifecycle message to an observer-side ledger.
fn apply_reliable(message: &SyncMessage, ledger: &mut OwnershipLedger) {
    match message {
        SyncMessage::EngageStarted { object, peer } => {
            ledger.grant(*object, *peer);
        }
        SyncMessage::EngageEnded { object, .. } => {
            ledger.release(*object);
        }
        SyncMessage::Snapshot { .. } => {}
    }
}
