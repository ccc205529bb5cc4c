use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::config::{CatalogEntry, CatalogSettings};
use crate::error::EngineError;

fn playlist(n: usize) -> Playlist {
    let tracks = (0..n)
        .map(|i| Track::new(format!("T{i}"), format!("/tmp/{i}.mp3")))
        .collect();
    Playlist::new(tracks).unwrap()
}

#[test]
fn empty_playlist_is_rejected() {
    assert!(Playlist::new(Vec::new()).is_err());
}

#[test]
fn next_and_previous_wrap_at_both_ends() {
    let p = playlist(4);
    assert_eq!(p.next(0), 1);
    assert_eq!(p.next(3), 0);
    assert_eq!(p.previous(0), 3);
    assert_eq!(p.previous(2), 1);
}

#[test]
fn next_then_previous_is_identity_for_any_length() {
    for n in 1..=7 {
        let p = playlist(n);
        for i in 0..n {
            assert_eq!(p.previous(p.next(i)), i, "n={n} i={i}");
            assert_eq!(p.next(p.previous(i)), i, "n={n} i={i}");
        }
    }
}

#[test]
fn single_track_playlist_navigates_to_itself() {
    let p = playlist(1);
    assert_eq!(p.next(0), 0);
    assert_eq!(p.previous(0), 0);
}

#[test]
fn get_reports_out_of_range() {
    let p = playlist(2);
    assert_eq!(p.get(1).unwrap().title, "T1");
    assert_eq!(
        p.get(2).unwrap_err(),
        EngineError::OutOfRange { index: 2, len: 2 }
    );
}

#[test]
fn from_entries_resolves_relative_paths_and_defaults_titles() {
    let entries = vec![
        CatalogEntry {
            title: Some("Metal Race".to_string()),
            path: PathBuf::from("metal_race.mp3"),
        },
        CatalogEntry {
            title: Some("   ".to_string()),
            path: PathBuf::from("/abs/next_funk.ogg"),
        },
    ];

    let tracks = from_entries(&entries, Path::new("/music"));
    assert_eq!(tracks[0], Track::new("Metal Race", "/music/metal_race.mp3"));
    assert_eq!(tracks[1], Track::new("next_funk", "/abs/next_funk.ogg"));
}

#[test]
fn default_catalog_is_the_four_reference_tracks() {
    let settings = CatalogSettings::default();
    let p = load_playlist(&settings, None).unwrap();
    let titles: Vec<&str> = p.tracks().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Metal Race", "Ditch Diggin", "Marvin's Dance", "Next Funk"]
    );
}

#[test]
fn scan_filters_non_audio_and_sorts_by_title_case_insensitive() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let tracks = scan(dir.path(), &CatalogSettings::default());
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "A");
    assert_eq!(tracks[1].title, "b");
}

#[test]
fn scan_respects_non_recursive_setting() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("top.wav"), b"x").unwrap();
    fs::write(dir.path().join("nested").join("deep.wav"), b"x").unwrap();

    let mut settings = CatalogSettings::default();
    settings.recursive = false;
    let tracks = scan(dir.path(), &settings);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "top");
}

#[test]
fn load_playlist_from_empty_directory_fails() {
    let dir = tempdir().unwrap();
    let err = load_playlist(&CatalogSettings::default(), Some(dir.path())).unwrap_err();
    assert!(err.to_string().contains("no playable tracks"));
}
