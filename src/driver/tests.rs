use crate::driver::{Driver, LinkState};
use crate::error::{Error, Result, VersionProblem};
use crate::memory::{AddressRef, Domain, MemoryImage, Port, Write};
use crate::platform::platinum::POLL_FLOOR;
use crate::platform::tests::{
    consume_mailbox, leave_overworld, relocate_save_block, sample_data, sample_data_without,
    sample_image, set_flag, set_received_count, BASE_OFFSET, HM01, IS_CHAMPION, MAILBOX, MAIN, SAVE_BLOCK,
    TRAINER_FLAGS_START,
};
use crate::protocol::{ClientStatus, Coordinator, Message};
use crate::session::{ClientSettings, ItemRecord, SessionState, SlotData};
use serde_json::json;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// A coordinator that remembers everything it was told.
#[derive(Default)]
struct Recorder {
    state: SessionState,
    settings: Option<ClientSettings>,
    auth: Option<String>,
    sent: Vec<Message>,
    refuse_sends: bool,
}

impl Coordinator for Recorder {
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    fn state(&self) -> &SessionState {
        &self.state
    }

    fn configure(&mut self, settings: &ClientSettings) -> Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn set_auth(&mut self, token: &str) -> Result<()> {
        self.auth = Some(token.to_string());
        Ok(())
    }

    fn send(&mut self, messages: &[Message]) -> Result<()> {
        if self.refuse_sends {
            return Err(Error::ProtocolSendFailure("refused".to_string()));
        }

        self.sent.extend_from_slice(messages);
        Ok(())
    }
}

/// An image whose emulator can be unplugged.
struct Plug {
    image: MemoryImage,
    online: bool,
}

impl Plug {
    fn check(&self) -> Result<()> {
        if self.online {
            Ok(())
        } else {
            Err(Error::ConnectionLost("unplugged".to_string()))
        }
    }
}

impl Port for Plug {
    fn connect(&mut self) -> Result<()> {
        self.check()
    }

    fn system(&mut self) -> Result<Option<String>> {
        self.check()?;
        self.image.system()
    }

    fn read(&mut self, reads: &[AddressRef]) -> Result<Vec<Vec<u8>>> {
        self.check()?;
        self.image.read(reads)
    }

    fn write(&mut self, writes: &[Write]) -> Result<()> {
        self.check()?;
        self.image.write(writes)
    }
}

fn tracked_session() -> SessionState {
    SessionState {
        team: 0,
        slot: Some(1),
        server_locations: (0..13)
            .map(|i| BASE_OFFSET + (HM01 + i) as i64)
            .chain(std::iter::once(BASE_OFFSET + 42))
            .collect(),
        ..Default::default()
    }
}

fn driver() -> Driver<MemoryImage, Recorder> {
    let recorder = Recorder {
        state: tracked_session(),
        ..Default::default()
    };

    Driver::new(
        sample_image(),
        recorder,
        sample_data(),
        Duration::from_millis(10),
        0,
    )
    .unwrap()
}

fn take_sent<P: Port>(driver: &mut Driver<P, Recorder>) -> Vec<Message> {
    std::mem::replace(&mut driver.coordinator_mut().sent, Vec::new())
}

fn baseline() -> Vec<Message> {
    vec![
        Message::set_bits("pokemon_platinum_events_0_1".to_string(), 0),
        Message::set_bits("pokemon_platinum_keys_0_1".to_string(), 0),
    ]
}

#[test]
fn first_cycle_syncs() {
    let mut driver = driver();
    assert_eq!(driver.state(), LinkState::Disconnected);
    assert_eq!(driver.interval(), POLL_FLOOR);

    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Synced);
    assert_eq!(
        driver.coordinator_mut().settings,
        Some(ClientSettings::for_game())
    );
    assert_eq!(driver.coordinator_mut().auth.as_deref(), Some("Player1"));
    assert_eq!(take_sent(&mut driver), baseline());

    driver.cycle().unwrap();
    assert!(take_sent(&mut driver).is_empty());
}

#[test]
fn checked_locations_accumulate() {
    let mut driver = driver();
    driver.cycle().unwrap();
    take_sent(&mut driver);

    set_flag(driver.port_mut(), SAVE_BLOCK, 42);
    driver.cycle().unwrap();
    assert_eq!(
        take_sent(&mut driver),
        vec![Message::LocationChecks {
            locations: vec![BASE_OFFSET + 42]
        }]
    );

    set_flag(driver.port_mut(), SAVE_BLOCK, HM01 + 1);
    driver.cycle().unwrap();
    assert_eq!(
        take_sent(&mut driver),
        vec![
            Message::LocationChecks {
                locations: vec![BASE_OFFSET + 42, BASE_OFFSET + (HM01 + 1) as i64]
            },
            Message::set_bits("pokemon_platinum_keys_0_1".to_string(), 2),
        ]
    );
}

#[test]
fn untracked_flags_are_not_reported() {
    let mut driver = driver();
    driver.cycle().unwrap();
    take_sent(&mut driver);

    set_flag(driver.port_mut(), SAVE_BLOCK, 43);
    driver.cycle().unwrap();

    assert!(take_sent(&mut driver).is_empty());
}

#[test]
fn goal_is_reported_once() {
    let mut driver = driver();
    driver.cycle().unwrap();
    take_sent(&mut driver);

    set_flag(driver.port_mut(), SAVE_BLOCK, IS_CHAMPION);
    for _ in 0..5 {
        driver.cycle().unwrap();
    }

    let goals = take_sent(&mut driver)
        .into_iter()
        .filter(|m| {
            *m == Message::StatusUpdate {
                status: ClientStatus::Goal,
            }
        })
        .count();
    assert_eq!(goals, 1);
}

#[test]
fn goal_follows_slot_data() {
    let mut driver = driver();
    driver.coordinator_mut().state.slot_data = SlotData::new(json!({"goal": 3}));
    driver.cycle().unwrap();
    take_sent(&mut driver);

    set_flag(driver.port_mut(), SAVE_BLOCK, IS_CHAMPION);
    driver.cycle().unwrap();
    assert!(!take_sent(&mut driver)
        .iter()
        .any(|m| matches!(m, Message::StatusUpdate { .. })));

    set_flag(driver.port_mut(), SAVE_BLOCK, TRAINER_FLAGS_START + 50);
    driver.cycle().unwrap();
    assert!(take_sent(&mut driver)
        .iter()
        .any(|m| matches!(m, Message::StatusUpdate { .. })));
}

#[test]
fn unresolvable_goal_watches_for_the_champion() {
    let recorder = Recorder {
        state: tracked_session(),
        ..Default::default()
    };
    let mut driver = Driver::new(
        sample_image(),
        recorder,
        sample_data_without(&["TRAINER_RIVAL_SURVIVAL_AREA"]),
        POLL_FLOOR,
        0,
    )
    .unwrap();
    driver.coordinator_mut().state.slot_data = SlotData::new(json!({"goal": 1}));
    driver.coordinator_mut().state.items_received = vec![ItemRecord {
        item: BASE_OFFSET + 7,
        location: BASE_OFFSET + 1,
        player: 2,
        flags: 0,
    }];
    set_flag(driver.port_mut(), SAVE_BLOCK, 42);

    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Synced);
    assert!(take_sent(&mut driver).contains(&Message::LocationChecks {
        locations: vec![BASE_OFFSET + 42]
    }));
    assert_eq!(
        driver.port_mut().peek(Domain::SystemBus, MAILBOX, 2).unwrap().to_vec(),
        vec![7, 0]
    );

    set_flag(driver.port_mut(), SAVE_BLOCK, IS_CHAMPION);
    driver.cycle().unwrap();
    assert!(take_sent(&mut driver).contains(&Message::StatusUpdate {
        status: ClientStatus::Goal
    }));
}

#[test]
fn leaving_the_overworld_pauses_sync() {
    let mut driver = driver();
    driver.cycle().unwrap();
    take_sent(&mut driver);

    leave_overworld(driver.port_mut());
    set_flag(driver.port_mut(), SAVE_BLOCK, 42);
    let trips = driver.port_mut().round_trips();
    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Unobservable);
    assert!(take_sent(&mut driver).is_empty());
    assert_eq!(driver.port_mut().round_trips(), trips + 1);

    let fresh = sample_image();
    let overworld = fresh.peek(Domain::SystemBus, MAIN + 4, 4).unwrap().to_vec();
    driver.port_mut().poke(Domain::SystemBus, MAIN + 4, &overworld);
    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Synced);
    assert_eq!(
        take_sent(&mut driver),
        vec![Message::LocationChecks {
            locations: vec![BASE_OFFSET + 42]
        }]
    );
}

#[test]
fn save_block_is_resolved_every_cycle() {
    let mut driver = driver();
    driver.cycle().unwrap();
    take_sent(&mut driver);

    let moved = SAVE_BLOCK + 0x80;
    set_flag(driver.port_mut(), moved, 42);
    relocate_save_block(driver.port_mut(), moved);
    driver.cycle().unwrap();

    assert_eq!(
        take_sent(&mut driver),
        vec![Message::LocationChecks {
            locations: vec![BASE_OFFSET + 42]
        }]
    );
}

#[test]
fn items_are_delivered_one_at_a_time() {
    let mut driver = driver();
    driver.coordinator_mut().state.items_received = (0..2)
        .map(|i| ItemRecord {
            item: BASE_OFFSET + 7 + i,
            location: BASE_OFFSET + 1,
            player: 2,
            flags: 1,
        })
        .collect();

    driver.cycle().unwrap();
    let mailbox = |driver: &mut Driver<MemoryImage, Recorder>| {
        driver
            .port_mut()
            .peek(Domain::SystemBus, MAILBOX, 6)
            .unwrap()
            .to_vec()
    };
    assert_eq!(mailbox(&mut driver), vec![7, 0, 1, 0, 1, 1]);

    let writes = driver.port_mut().write_log().len();
    driver.cycle().unwrap();
    assert_eq!(driver.port_mut().write_log().len(), writes);

    consume_mailbox(driver.port_mut());
    set_received_count(driver.port_mut(), SAVE_BLOCK, 1);
    driver.cycle().unwrap();
    assert_eq!(mailbox(&mut driver), vec![8, 0, 2, 0, 1, 1]);

    consume_mailbox(driver.port_mut());
    set_received_count(driver.port_mut(), SAVE_BLOCK, 2);
    let writes = driver.port_mut().write_log().len();
    driver.cycle().unwrap();
    assert_eq!(driver.port_mut().write_log().len(), writes);
}

#[test]
fn invalid_items_skip_the_cycle() {
    let mut driver = driver();
    driver.coordinator_mut().state.items_received = vec![ItemRecord {
        item: 5,
        location: 0,
        player: 0,
        flags: 0,
    }];

    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Synced);
    assert!(driver.port_mut().write_log().is_empty());
    assert_eq!(take_sent(&mut driver), baseline());
}

#[test]
fn progress_waits_for_a_slot() {
    let mut driver = driver();
    driver.coordinator_mut().state.slot = None;
    set_flag(driver.port_mut(), SAVE_BLOCK, 42);

    driver.cycle().unwrap();
    assert_eq!(driver.state(), LinkState::Synced);
    assert!(take_sent(&mut driver).is_empty());

    driver.coordinator_mut().state.slot = Some(1);
    driver.cycle().unwrap();

    let sent = take_sent(&mut driver);
    assert_eq!(
        sent[0],
        Message::LocationChecks {
            locations: vec![BASE_OFFSET + 42]
        }
    );
    assert_eq!(&sent[1..], &baseline()[..]);
}

#[test]
fn send_failures_are_not_retried() {
    let mut driver = driver();
    driver.coordinator_mut().refuse_sends = true;
    driver.cycle().unwrap();

    driver.coordinator_mut().refuse_sends = false;
    driver.cycle().unwrap();

    assert_eq!(driver.state(), LinkState::Synced);
    assert!(take_sent(&mut driver).is_empty());
}

#[test]
fn lost_connection_starts_over() {
    let plug = Plug {
        image: sample_image(),
        online: true,
    };
    let recorder = Recorder {
        state: tracked_session(),
        ..Default::default()
    };
    let mut driver = Driver::new(plug, recorder, sample_data(), POLL_FLOOR, 0).unwrap();

    driver.cycle().unwrap();
    assert_eq!(take_sent(&mut driver), baseline());

    driver.port_mut().online = false;
    driver.cycle().unwrap();
    assert_eq!(driver.state(), LinkState::Disconnected);

    driver.cycle().unwrap();
    assert_eq!(driver.state(), LinkState::Disconnected);

    driver.port_mut().online = true;
    driver.cycle().unwrap();
    assert_eq!(driver.state(), LinkState::Synced);
    assert_eq!(take_sent(&mut driver), baseline());
}

#[test]
fn unpatched_image_is_fatal() {
    let mut image = sample_image();
    image.poke(Domain::Rom, 0, b"POKEMON PLCPUE01\0\0");
    let mut driver = Driver::new(
        image,
        Recorder::default(),
        sample_data(),
        POLL_FLOOR,
        0,
    )
    .unwrap();

    match driver.cycle() {
        Err(Error::VersionMismatch(VersionProblem::Unpatched)) => {}
        other => panic!("expected an unpatched image, got {:?}", other),
    }
    assert!(driver.coordinator_mut().settings.is_none());
}

#[test]
fn wrong_system_is_fatal() {
    let mut driver = driver();
    driver.port_mut().set_system("GBA");

    assert!(matches!(driver.cycle(), Err(Error::IdentityMismatch(_))));
}

#[test]
fn revalidation_catches_swapped_games() {
    let mut driver = Driver::new(
        sample_image(),
        Recorder::default(),
        sample_data(),
        POLL_FLOOR,
        3,
    )
    .unwrap();

    driver.cycle().unwrap();
    driver.port_mut().poke(Domain::Rom, 0, b"POKEMON D\0\0\0\0\0\0\0\0\0");

    driver.cycle().unwrap();
    driver.cycle().unwrap();
    assert!(matches!(driver.cycle(), Err(Error::IdentityMismatch(_))));
}

#[test]
fn run_stops_when_cancelled() {
    let mut driver = driver();

    driver.run(&AtomicBool::new(true)).unwrap();

    assert_eq!(driver.state(), LinkState::Disconnected);
    assert_eq!(driver.port_mut().round_trips(), 0);
}

#[test]
fn run_ends_on_rejection() {
    let mut image = sample_image();
    image.poke(Domain::Rom, 0, b"POKEMON PLAPCPUE00");
    let mut driver = Driver::new(
        image,
        Recorder::default(),
        sample_data(),
        POLL_FLOOR,
        0,
    )
    .unwrap();

    assert!(matches!(
        driver.run(&AtomicBool::new(false)),
        Err(Error::VersionMismatch(VersionProblem::WrongBuild(_)))
    ));
}

#[test]
fn missing_game_data_is_reported() {
    let result = Driver::new(
        sample_image(),
        Recorder::default(),
        crate::platform::GameData::new(BASE_OFFSET),
        POLL_FLOOR,
        0,
    );

    assert!(matches!(result, Err(Error::MissingData(_))));
}
