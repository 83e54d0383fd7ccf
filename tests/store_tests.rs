//! Package store integration tests
//!
//! Exercise the on-disk behavior: destructive collision handling and the
//! recency ordering used by the menus.

use std::fs;
use tempfile::TempDir;

use nexus::store::{ListOrder, PackageStore, remove_directory};

#[test]
fn test_second_creation_replaces_first() {
    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());

    let first = store.create_package_directory("Foo").unwrap();
    fs::write(first.join("foo.msi"), b"first attempt").unwrap();
    fs::create_dir(first.join("nested")).unwrap();

    let second = store.create_package_directory("Foo").unwrap();
    assert_eq!(first, second);
    assert!(second.is_dir());
    assert_eq!(fs::read_dir(&second).unwrap().count(), 0);
}

#[test]
fn test_collision_removes_prefix_siblings() {
    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());
    fs::create_dir(tmp.path().join("zoom")).unwrap();
    fs::create_dir(tmp.path().join("zoom-old")).unwrap();
    fs::create_dir(tmp.path().join("vlc-media-player")).unwrap();

    store.create_package_directory("Zoom").unwrap();

    assert!(tmp.path().join("zoom").is_dir());
    assert!(!tmp.path().join("zoom-old").exists());
    assert!(tmp.path().join("vlc-media-player").is_dir());
}

#[test]
fn test_siblings_survive_without_exact_match() {
    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());
    fs::create_dir(tmp.path().join("zoom-old")).unwrap();

    store.create_package_directory("Zoom").unwrap();

    assert!(tmp.path().join("zoom-old").is_dir());
    assert!(tmp.path().join("zoom").is_dir());
}

#[test]
fn test_unusable_name_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());
    assert!(store.create_package_directory("***").is_err());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_name_order_and_display_names() {
    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());
    for dir in ["notepad", "7-zip", "microsoft-office"] {
        fs::create_dir(tmp.path().join(dir)).unwrap();
    }

    let names: Vec<String> = store
        .entries(ListOrder::Name)
        .unwrap()
        .into_iter()
        .map(|entry| entry.display_name)
        .collect();
    assert_eq!(names, vec!["7 Zip", "Microsoft Office", "Notepad"]);
}

#[test]
fn test_remove_directory_is_best_effort() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("gone");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("file"), b"x").unwrap();

    assert!(remove_directory(&dir));
    assert!(!dir.exists());
    assert!(remove_directory(&dir));
}

#[cfg(unix)]
#[test]
fn test_recent_packages_newest_first() {
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    let tmp = TempDir::new().unwrap();
    let store = PackageStore::new(tmp.path());
    let now = SystemTime::now();

    for (dir, age_secs) in [("zoom", 300), ("google-chrome", 10), ("7-zip", 600), ("notepad", 60)] {
        let path = tmp.path().join(dir);
        fs::create_dir(&path).unwrap();
        File::open(&path)
            .unwrap()
            .set_modified(now - Duration::from_secs(age_secs))
            .unwrap();
    }

    assert_eq!(
        store.recent_packages(3).unwrap(),
        vec!["Google Chrome", "Notepad", "Zoom"]
    );
    assert_eq!(store.list_packages().unwrap().last().map(String::as_str), Some("7 Zip"));
}
