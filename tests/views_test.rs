//! End-to-end page flows: session and guard, watchlist hydration, and the
//! randomizer resolving its winner through the cache.

use chrono::NaiveDate;
use mrate_client::clock::ManualClock;
use mrate_client::guard::{GuardAction, CLEAR_SESSION_COOKIE};
use mrate_client::models::{SharedWatchlist, SharedWatchlistEntry, Watchlist, WatchlistEntry};
use mrate_client::omdb::memory::{movie_stub, InMemorySource};
use mrate_client::store::InMemoryStore;
use mrate_client::token::unsigned_token;
use mrate_client::views::{
    wheel_url, ListQuery, MovieOption, SharedWatchlistState, WatchedFilter, WatchlistState, Wheel,
};
use mrate_client::{MovieService, RouteGuard, Session};
use std::collections::HashMap;
use std::sync::Arc;

const NOW_MILLIS: i64 = 1_700_000_000_000;

fn movies() -> (MovieService<InMemoryStore, InMemorySource>, InMemorySource) {
    let mut source = InMemorySource::new();
    source.insert_movie(movie_stub("tt1375666", "Inception", "2010"));
    source.insert_movie(movie_stub("tt1049413", "Up", "2009"));
    (MovieService::new(InMemoryStore::new(), source.clone()), source)
}

#[test]
fn test_cookie_to_guard_decision() {
    let guard = RouteGuard::with_clock(Arc::new(ManualClock::new(NOW_MILLIS)));
    let live = unsigned_token(r#"{"sub":"ronan","roles":"USER","exp":1700003600}"#);
    let cookie = format!("theme=dark; accessToken={}", live);

    let session = Session::from_cookie_header(&cookie);
    let token = session.token();

    assert!(guard.evaluate("/watchlist", token.as_deref()).is_allowed());
    assert_eq!(
        guard.evaluate("/admin", token.as_deref()).action,
        GuardAction::Redirect("/".to_string())
    );
    assert_eq!(
        guard.evaluate("/signup", token.as_deref()).action,
        GuardAction::Redirect("/".to_string())
    );

    let stale = Session::from_cookie_header("accessToken=not.a-token");
    let outcome = guard.evaluate("/", stale.token().as_deref());
    assert_eq!(outcome.action, GuardAction::Redirect("/login".to_string()));
    assert_eq!(outcome.set_cookie_header(), Some(CLEAR_SESSION_COOKIE));
}

#[tokio::test]
async fn test_watchlist_hydration_skips_unknown_movies() {
    let (movies, _) = movies();
    let mut entries = HashMap::new();
    for (id, day, watched) in [("tt1375666", 1, true), ("tt1049413", 2, false), ("tt404", 3, false)] {
        entries.insert(
            id.to_string(),
            WatchlistEntry {
                watched,
                added_date: NaiveDate::from_ymd_opt(2024, 6, day).and_then(|d| d.and_hms_opt(8, 0, 0)),
                rating: None,
            },
        );
    }
    let watchlist = Watchlist {
        id: Some("w1".into()),
        user_id: Some("u1".into()),
        movies: entries,
    };

    let state = WatchlistState::hydrate(watchlist, &movies).await;
    assert_eq!(state.len(), 2);

    let newest = state.view(&ListQuery::new());
    assert_eq!(newest[0].movie.title, "Up");

    let watched = state.view(&ListQuery::new().with_watched(WatchedFilter::Watched));
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].movie.title, "Inception");
}

#[tokio::test]
async fn test_shared_watchlist_hydration() {
    let (movies, _) = movies();
    let mut entries = HashMap::new();
    entries.insert(
        "tt1375666".to_string(),
        SharedWatchlistEntry {
            ratings: [("a".to_string(), 9.0), ("b".to_string(), 8.0)].into_iter().collect(),
            ..Default::default()
        },
    );
    entries.insert("tt1049413".to_string(), SharedWatchlistEntry::default());

    let list = SharedWatchlist {
        name: "Movie night".into(),
        user_ids: vec!["a".into(), "b".into()],
        movies: entries,
        ..Default::default()
    };

    let state = SharedWatchlistState::hydrate(list, &movies).await;
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.progress(), 50);
}

#[tokio::test]
async fn test_wheel_resolves_winner_through_cache() {
    let (movies, source) = movies();
    let url = wheel_url(&[
        MovieOption::new("Inception", "tt1375666"),
        MovieOption::new("Up", "tt1049413"),
    ])
    .expect("Failed to build url");
    let query = url.split_once('?').map(|(_, q)| q).expect("URL has a query");

    let wheel = Wheel::from_query(query);
    let index = wheel.spin().expect("Wheel has segments");
    let winner = wheel
        .winner_details(index, &movies)
        .await
        .expect("Failed to load winner")
        .expect("Movie wheel always has a winner");
    assert_eq!(Some(&winner.imdb_id), wheel.winner(index).map(|o| &o.imdb_id));

    wheel
        .winner_details(index, &movies)
        .await
        .expect("Failed to load winner");
    assert_eq!(source.calls(), 1);

    let placeholder = Wheel::from_query("");
    assert_eq!(
        placeholder
            .winner_details(0, &movies)
            .await
            .expect("Placeholder lookup never fails"),
        None
    );
}
