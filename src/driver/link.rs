use crate::delivery::{deliver_next, Mailbox};
use crate::error::{Error, Result};
use crate::memory::{guarded_read, AddressRef, Endianness, Guard, Port};
use crate::platform::platinum::{self, Goal, Layout, FLAG_COUNT, POLL_FLOOR};
use crate::platform::GameData;
use crate::protocol::{translate, Coordinator, Message};
use crate::session::{self, SessionState};
use crate::snapshot::{FlagBitfield, Rules, Snapshot, Tracker};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// How much we currently know about the running game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// No emulator to talk to.
    Disconnected,

    /// Connected, but we have not yet read the game's state.
    Validating,

    /// The last cycle read the game's state.
    Synced,

    /// The game is somewhere its state cannot be trusted, e.g. in a menu.
    Unobservable,
}

/// Runs synchronization cycles against one emulator and one coordinator.
pub struct Driver<P, C> {
    port: P,
    coordinator: C,
    data: GameData,
    layout: Layout,
    mailbox: Mailbox,
    rules: Rules,
    goal: Goal,
    tracker: Tracker,
    state: LinkState,
    configured: bool,
    interval: Duration,
    revalidate_every: u32,
    cycles_since_validation: u32,
}

impl<P, C> Driver<P, C>
where
    P: Port,
    C: Coordinator,
{
    /// Construct a driver.
    ///
    /// `interval` is raised to the minimum polling interval if needed. The
    /// game image is validated again every `revalidate_every` cycles; zero
    /// only validates after connecting.
    pub fn new(
        port: P,
        coordinator: C,
        data: GameData,
        interval: Duration,
        revalidate_every: u32,
    ) -> Result<Self> {
        let layout = Layout::from_data(&data)?;
        let mailbox = Mailbox::new(layout.mailbox().clone());
        let goal = Goal::default();
        let rules = Rules::new(
            data.base_offset(),
            goal.flag(&data)?,
            platinum::tracked_events(&data),
            platinum::key_locations(&data),
        );

        Ok(Driver {
            port,
            coordinator,
            data,
            layout,
            mailbox,
            rules,
            goal,
            tracker: Tracker::new(),
            state: LinkState::Disconnected,
            configured: false,
            interval: interval.max(POLL_FLOOR),
            revalidate_every,
            cycles_since_validation: 0,
        })
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    #[cfg(test)]
    pub fn coordinator_mut(&mut self) -> &mut C {
        &mut self.coordinator
    }

    /// Run cycles until cancelled or until the game image is rejected.
    ///
    /// Cancellation is checked between cycles; a cycle in flight finishes.
    pub fn run(&mut self, cancelled: &AtomicBool) -> Result<()> {
        while !cancelled.load(Ordering::SeqCst) {
            self.cycle()?;
            thread::sleep(self.interval);
        }

        info!("Stopped watching the game");

        Ok(())
    }

    /// Run one synchronization cycle.
    ///
    /// Only fatal errors are returned. Everything else is logged and the
    /// cycle is skipped; a lost connection also forgets the accepted
    /// snapshot.
    pub fn cycle(&mut self) -> Result<()> {
        match self.try_cycle() {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                error!("Giving up on this game image: {}", e);
                Err(e)
            }
            Err(Error::ConnectionLost(reason)) => {
                if self.state == LinkState::Disconnected {
                    debug!("Emulator not reachable: {}", reason);
                } else {
                    warn!("Lost connection to the emulator: {}", reason);
                    self.disconnect();
                }

                Ok(())
            }
            Err(e) => {
                warn!("Skipping cycle: {}", e);
                Ok(())
            }
        }
    }

    fn transition(&mut self, state: LinkState) {
        if self.state != state {
            info!("{:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn disconnect(&mut self) {
        self.transition(LinkState::Disconnected);
        self.tracker.reset();
        self.configured = false;
    }

    fn try_cycle(&mut self) -> Result<()> {
        if self.state == LinkState::Disconnected {
            self.port.connect()?;
            self.transition(LinkState::Validating);
        }

        let revalidate =
            self.revalidate_every > 0 && self.cycles_since_validation >= self.revalidate_every;
        if !self.configured || revalidate {
            self.validate()?;
        }
        self.cycles_since_validation += 1;

        self.coordinator.refresh()?;
        self.update_goal()?;

        self.observe()
    }

    fn validate(&mut self) -> Result<()> {
        session::check_system(&mut self.port)?;
        let settings = session::validate(&mut self.port, &self.layout)?;

        if !self.configured {
            self.coordinator.configure(&settings)?;
            let token = session::establish_auth(&mut self.port, &self.layout)?;
            self.coordinator.set_auth(&token)?;

            self.interval = self.interval.max(settings.watcher_timeout);
            self.configured = true;
        }

        self.cycles_since_validation = 0;

        Ok(())
    }

    fn update_goal(&mut self) -> Result<()> {
        let goal = self.coordinator.state().slot_data.goal();

        if goal != self.goal {
            self.rules.set_goal_flag(goal.flag(&self.data)?);
            info!("Goal is now {:?}", goal);
            self.goal = goal;
        }

        Ok(())
    }

    fn unobservable(&mut self, why: &str) -> Result<()> {
        debug!("Game state not observable: {}", why);

        if self.state == LinkState::Synced {
            self.transition(LinkState::Unobservable);
        }

        Ok(())
    }

    /// Read the game's state, report what changed and hand over the next
    /// item.
    fn observe(&mut self) -> Result<()> {
        let overworld = self.layout.overworld_guard().clone();
        let pointer = self.layout.save_block().pointer().clone();

        let raw_pointer =
            match guarded_read(&mut self.port, &[pointer.clone()], &[overworld.clone()])? {
                Some(mut data) => data.pop().unwrap_or_default(),
                None => return self.unobservable("not in the overworld"),
            };
        let save_block = self.layout.save_block().resolve(&raw_pointer);
        let guards = [overworld, Guard::new(pointer, raw_pointer)];

        let flags = self.layout.flag_chunks(&save_block);
        let bits = match guarded_read(&mut self.port, &flags, &guards)? {
            Some(chunks) => FlagBitfield::from_chunks(&chunks),
            None => return self.unobservable("save block moved while reading flags"),
        };
        if bits.bit_count() != FLAG_COUNT {
            return Err(Error::ConnectionLost(format!(
                "read {} save flags instead of {}",
                bits.bit_count(),
                FLAG_COUNT
            )));
        }

        self.transition(LinkState::Synced);

        let messages = self.diff(&bits);
        let delivered = self.deliver(&save_block, &guards);
        self.send(&messages);

        delivered
    }

    fn diff(&mut self, bits: &FlagBitfield) -> Vec<Message> {
        let state = self.coordinator.state();
        if state.slot.is_none() {
            debug!("No slot assigned yet, holding back game progress");
            return Vec::new();
        }

        let snapshot = Snapshot::capture(bits, &self.rules, &state.server_locations);
        let delta = self.tracker.observe(snapshot);

        translate(&delta, state)
    }

    fn deliver(&mut self, save_block: &AddressRef, guards: &[Guard]) -> Result<()> {
        let reads = [self.layout.received_count(save_block), self.mailbox.full_flag()];
        let data = match guarded_read(&mut self.port, &reads, guards)? {
            Some(data) => data,
            None => return self.unobservable("save block moved while reading the mailbox"),
        };

        let (received_count, full) = match (data.get(0), data.get(1).and_then(|f| f.first())) {
            (Some(count), Some(full)) if count.len() == 2 => {
                (Endianness::LittleEndian.decode::<u16>(count), *full != 0)
            }
            _ => {
                return Err(Error::ConnectionLost(
                    "malformed received item counter".to_string(),
                ))
            }
        };

        let state: &SessionState = self.coordinator.state();
        deliver_next(
            &mut self.port,
            &self.mailbox,
            received_count,
            full,
            &state.items_received,
            self.data.base_offset(),
        )?;

        Ok(())
    }

    fn send(&mut self, messages: &[Message]) {
        if messages.is_empty() {
            return;
        }

        match self.coordinator.send(messages) {
            Ok(()) => debug!("Sent {} message(s)", messages.len()),
            Err(e) => warn!("Dropped {} message(s): {}", messages.len(), e),
        }
    }
}
