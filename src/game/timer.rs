//! Countdown timer for timed drills
//!
//! The timer has no clock of its own. The owner feeds it elapsed time and
//! reacts to the returned [`TimerEvent`].

use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Nothing changed: paused, already expired, or no whole second elapsed
    Idle,
    /// One or more seconds were counted down
    Ticked,
    /// The countdown reached zero. Reported once per run of the timer.
    Expired,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    total_secs: u32,
    remaining_secs: u32,
    running: bool,
    carry: Duration,
}

impl CountdownTimer {
    pub fn new(minutes: u32) -> Self {
        let total_secs = minutes.saturating_mul(60);
        Self {
            total_secs,
            remaining_secs: total_secs,
            running: false,
            carry: Duration::ZERO,
        }
    }

    /// Resume counting down. Starting a running timer does nothing, so there
    /// is never more than one tick source.
    pub fn start(&mut self) {
        if !self.running && self.remaining_secs > 0 {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Back to the full duration, stopped
    pub fn reset(&mut self) {
        self.remaining_secs = self.total_secs;
        self.running = false;
        self.carry = Duration::ZERO;
    }

    /// Count down one second
    pub fn tick(&mut self) -> TimerEvent {
        if !self.running || self.remaining_secs == 0 {
            return TimerEvent::Idle;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.running = false;
            self.carry = Duration::ZERO;
            return TimerEvent::Expired;
        }
        TimerEvent::Ticked
    }

    /// Feed elapsed wall time; one tick per whole second, remainder carried
    pub fn advance(&mut self, elapsed: Duration) -> TimerEvent {
        if !self.running {
            return TimerEvent::Idle;
        }
        self.carry += elapsed;
        let mut event = TimerEvent::Idle;
        while self.carry >= TICK {
            self.carry -= TICK;
            match self.tick() {
                TimerEvent::Expired => return TimerEvent::Expired,
                TimerEvent::Ticked => event = TimerEvent::Ticked,
                TimerEvent::Idle => break,
            }
        }
        event
    }

    /// Time until the next tick fires, `None` while stopped
    pub fn until_next_tick(&self) -> Option<Duration> {
        if self.running && self.remaining_secs > 0 {
            Some(TICK.saturating_sub(self.carry))
        } else {
            None
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.total_secs > 0 && self.remaining_secs == 0
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once() {
        for minutes in 1..=3 {
            let mut timer = CountdownTimer::new(minutes);
            timer.start();
            let mut expiries = 0;
            for _ in 0..(minutes * 60 + 30) {
                if timer.tick() == TimerEvent::Expired {
                    expiries += 1;
                }
            }
            assert_eq!(expiries, 1);
            assert_eq!(timer.remaining_secs(), 0);
            assert!(!timer.is_running());
        }
    }

    #[test]
    fn paused_timer_keeps_remaining() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        assert_eq!(timer.tick(), TimerEvent::Idle);
        assert_eq!(timer.remaining_secs(), 58);
        timer.start();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 57);
    }

    #[test]
    fn double_start_does_not_double_tick() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        timer.start();
        timer.advance(Duration::from_secs(1));
        assert_eq!(timer.remaining_secs(), 59);
    }

    #[test]
    fn reset_restores_duration_without_expiry() {
        let mut timer = CountdownTimer::new(2);
        timer.start();
        timer.advance(Duration::from_secs(30));
        timer.reset();
        assert_eq!(timer.remaining_secs(), 120);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), TimerEvent::Idle);
    }

    #[test]
    fn advance_carries_sub_second_remainder() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        assert_eq!(timer.advance(Duration::from_millis(600)), TimerEvent::Idle);
        assert_eq!(timer.until_next_tick(), Some(Duration::from_millis(400)));
        assert_eq!(timer.advance(Duration::from_millis(600)), TimerEvent::Ticked);
        assert_eq!(timer.remaining_secs(), 59);
        assert_eq!(timer.until_next_tick(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn advance_past_zero_reports_expiry() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        assert_eq!(timer.advance(Duration::from_secs(500)), TimerEvent::Expired);
        assert_eq!(timer.remaining_secs(), 0);
        assert_eq!(timer.advance(Duration::from_secs(5)), TimerEvent::Idle);
        assert_eq!(timer.display(), "00:00");
    }

    #[test]
    fn zero_minute_timer_never_starts() {
        let mut timer = CountdownTimer::new(0);
        timer.start();
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), TimerEvent::Idle);
    }
}
