//! SIGINT handling
//!
//! The signal handler is process-wide, so this lives in its own test binary.

use blinky::mock::{Event, MockChip};
use blinky::{BlinkConfig, CancellationToken, Delay, Level, PinController, State, cancel_on_interrupt};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn sigint_stops_the_blink_loop_and_releases_the_line() {
    let chip = MockChip::new();
    let token = CancellationToken::new();
    cancel_on_interrupt(&token);

    let mut delay = Delay::new(token.clone());
    let mut pin = PinController::new(
        chip.clone(),
        BlinkConfig {
            half_period: Duration::from_millis(20),
            ..BlinkConfig::default()
        },
    );

    let pid = std::process::id().to_string();
    let interrupt = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        Command::new("kill").args(["-INT", &pid]).status().unwrap()
    });

    let start = Instant::now();
    let writes = pin.run(&mut delay, &token).unwrap();
    let status = interrupt.join().unwrap();

    assert!(status.success());
    assert!(token.is_cancelled());
    assert!(writes >= 2, "only {} writes", writes);
    assert!(start.elapsed() < Duration::from_secs(5));

    assert_eq!(pin.state(), State::Released);
    assert_eq!(chip.level(17), Some(Level::Low));
    assert!(!chip.is_claimed(17));
    assert_eq!(chip.events().last(), Some(&Event::Released { offset: 17 }));
}
