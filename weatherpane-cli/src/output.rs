use chrono::Local;
use weatherpane_core::{
    CityEntry, RefreshOutcome, ScreenState, ScreenView, WeatherError, WeatherSnapshot,
};

pub fn print_state(state: &ScreenState, use_celsius: bool) {
    match state {
        ScreenState::Initializing | ScreenState::Loading { .. } => println!("Loading"),
        ScreenState::Ready { snapshot } => print_snapshot(snapshot, use_celsius),
        ScreenState::Refreshing { snapshot } => {
            print_snapshot(snapshot, use_celsius);
            println!("(refreshing)");
        }
        ScreenState::Error {
            coordinates,
            message,
            last,
        } => {
            if let Some(snapshot) = last {
                print_snapshot(snapshot, use_celsius);
                println!();
            }
            println!("Could not load weather for {coordinates}: {message}");
        }
    }
}

fn print_snapshot(snapshot: &WeatherSnapshot, use_celsius: bool) {
    let view = ScreenView::build(snapshot, use_celsius, &Local::now());

    println!("{}", view.weekday);
    println!("{}", view.date);
    println!("{}", view.city);
    println!();
    println!("{}", view.temperature);
    println!("{}  [{}]", view.condition, view.imagery.name());
}

pub fn print_outcome(outcome: &Result<RefreshOutcome, WeatherError>) {
    match outcome {
        Ok(RefreshOutcome::Updated(snapshot)) => println!("Updated {}.", snapshot.city),
        Ok(RefreshOutcome::Unchanged) => println!("Already up to date."),
        Ok(RefreshOutcome::Superseded) => println!("A newer request took over."),
        Ok(RefreshOutcome::Busy) => println!("A refresh is already running."),
        Err(err) => println!("Error: {err}"),
    }
}

pub fn city_label(entry: &CityEntry) -> String {
    format!("{}, {} ({})", entry.name, entry.country_code, entry.coordinates)
}
