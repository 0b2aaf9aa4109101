use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::thread;
use tar::{Builder, EntryType, Header};
use tar_fs::{read_tar, Catalog, CatalogConfig, File, FileSystem, TarFileSystem};

const SITE: &[(&str, &str)] = &[
    (
        "index.html",
        r#"<ul>
    <li><a href="./about/">About</a></li>
    <li><a href="./contact/">Contact</a></li>
</ul>"#,
    ),
    ("about/index.html", "We are four adventurers."),
    ("contact/index.html", "Somewhere over the rainbow."),
];

fn site_catalog() -> Catalog {
    let mut builder = Builder::new(Vec::new());
    for (path, body) in SITE {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_700_000_000);
        builder.append_data(&mut header, path, body.as_bytes()).unwrap();
    }
    let data = builder.into_inner().unwrap();
    read_tar(data.as_slice(), CatalogConfig::default()).unwrap()
}

fn site_fs() -> TarFileSystem {
    TarFileSystem::new(site_catalog())
}

#[test]
fn open_returns_recorded_metadata_for_every_key() {
    let fs = site_fs();
    let keys: Vec<String> = fs.catalog().paths().map(String::from).collect();

    for key in keys {
        let file = fs.open(&key).unwrap();
        assert_eq!(file.stat(), fs.catalog().get(&key).unwrap().meta());
    }
}

#[test]
fn handles_share_metadata_with_catalog() {
    let fs = site_fs();
    let a = fs.open("about/index.html").unwrap();
    let b = fs.open("about/index.html").unwrap();

    let recorded = fs.catalog().get("about/index.html").unwrap().meta();
    assert!(std::ptr::eq(a.stat(), b.stat()));
    assert!(std::ptr::eq(a.stat(), recorded));
}

#[test]
fn open_reads_file_content() {
    let fs = site_fs();
    let mut file = fs.open("about/index.html").unwrap();

    let mut body = String::new();
    file.read_to_string(&mut body).unwrap();
    assert_eq!(body, "We are four adventurers.");
    assert_eq!(file.stat().size(), body.len() as u64);

    // Past the end is an end-of-content signal, not an error.
    let mut buf = [0u8; 8];
    assert_eq!(file.read(&mut buf).unwrap(), 0);
}

#[test]
fn root_lists_children_in_scan_order() {
    let fs = site_fs();
    let mut root = fs.open(".").unwrap();
    assert!(root.stat().is_dir());

    let listing = root.read_dir(-1);
    let names: Vec<&str> = listing.entries.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["index.html", "about", "contact"]);
    assert!(!listing.end_of_stream);
    assert!(listing.entries[1].is_dir());
}

#[test]
fn open_missing_is_not_found() {
    let fs = site_fs();
    let err = fs.open("missing").unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.path(), "missing");
    assert_eq!(err.to_string(), "open missing: file does not exist");

    let io_err: std::io::Error = err.into();
    assert_eq!(io_err.kind(), ErrorKind::NotFound);
}

#[test]
fn open_does_not_normalize() {
    let fs = site_fs();
    assert!(fs.open("/about/index.html").is_err());
    assert!(fs.open("about/").is_err());
    assert!(fs.open("./index.html").is_err());
}

#[test]
fn seek_is_bounded_to_content() {
    let fs = site_fs();
    let mut file = fs.open("about/index.html").unwrap();

    assert_eq!(file.seek(SeekFrom::Start(7)).unwrap(), 7);
    let mut word = [0u8; 4];
    file.read_exact(&mut word).unwrap();
    assert_eq!(&word, b"four");

    assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), 24);
    assert_eq!(file.seek(SeekFrom::Current(-1)).unwrap(), 23);

    let err = file.seek(SeekFrom::End(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = file.seek(SeekFrom::Current(-100)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    // A failed seek leaves the position alone.
    assert_eq!(file.position(), 23);
}

#[test]
fn directory_handles_have_empty_content() {
    let fs = site_fs();
    let mut dir = fs.open("about").unwrap();

    let mut buf = Vec::new();
    assert_eq!(dir.read_to_end(&mut buf).unwrap(), 0);
    assert!(dir.content().is_empty());

    let mut file = fs.open("about/index.html").unwrap();
    assert!(file.read_dir(-1).entries.is_empty());
}

#[test]
fn handles_on_same_path_have_independent_cursors() {
    let fs = site_fs();
    let mut first = fs.open(".").unwrap();
    let mut second = fs.open(".").unwrap();

    assert_eq!(first.read_dir(2).entries.len(), 2);
    let all = second.read_dir(0);
    assert_eq!(all.entries.len(), 3);

    let last = first.read_dir(2);
    assert_eq!(last.entries.len(), 1);
    assert_eq!(last.entries[0].name(), "contact");
    assert!(last.end_of_stream);
}

#[test]
fn readdir_one_at_a_time_signals_with_last_child() {
    let fs = site_fs();
    let mut root = fs.open(".").unwrap();

    let mut seen = Vec::new();
    for i in 0..3 {
        let batch = root.read_dir(1);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.end_of_stream, i == 2);
        seen.push(batch.entries[0].name().to_string());
    }
    assert_eq!(seen, vec!["index.html", "about", "contact"]);

    let after = root.read_dir(1);
    assert!(after.entries.is_empty());
    assert!(!after.end_of_stream);
}

#[test]
fn handles_share_catalog_across_threads() {
    let catalog = Arc::new(site_catalog());
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let fs = TarFileSystem::from_shared(Arc::clone(&catalog));
            thread::spawn(move || {
                let mut file = fs.open("contact/index.html").unwrap();
                let mut body = String::new();
                file.read_to_string(&mut body).unwrap();
                body
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), "Somewhere over the rainbow.");
    }
}
