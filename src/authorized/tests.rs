use std::fs;
use std::sync::Arc;

use super::*;
use crate::registry::MemoryRegistry;
use crate::testutil::openssh_key;

fn template() -> EntryTemplate {
    EntryTemplate::new("/opt/forge/forge", "/opt/forge/custom/conf/app.ini")
}

fn key(id: i64, seed: u32) -> PublicKey {
    let content = openssh_key("ssh-ed25519", seed, "me@host");
    let mut key = PublicKey::new(1, format!("key{}", seed), content);
    key.id = id;
    key
}

fn lines(authorized: &AuthorizedKeys) -> Vec<String> {
    fs::read_to_string(authorized.path())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn registry_with(count: u32) -> MemoryRegistry {
    let registry = MemoryRegistry::new();
    for seed in 0..count {
        registry
            .insert(
                PublicKey::new(1, format!("key{}", seed), openssh_key("ssh-rsa", seed, "me@host"))
                    .with_fingerprint(format!("fp{}", seed)),
            )
            .unwrap();
    }
    registry
}

#[test]
fn test_render_line() {
    let mut key = PublicKey::new(1, "laptop", "ssh-ed25519 AAAA me@host");
    key.id = 42;

    assert_eq!(
        template().render(&key),
        "command=\"/opt/forge/forge serv key-42 --config='/opt/forge/custom/conf/app.ini'\",\
         no-port-forwarding,no-X11-forwarding,no-agent-forwarding,no-pty ssh-ed25519 AAAA me@host\n"
    );
}

#[test]
fn test_add_appends_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());

    authorized.add(&[key(1, 1), key(2, 2)]).unwrap();
    authorized.add(&[key(3, 3)]).unwrap();

    let lines = lines(&authorized);
    assert_eq!(lines.len(), 3);
    for (line, id) in lines.iter().zip([1, 2, 3]) {
        assert!(line.contains(&format!("serv key-{} ", id)));
        assert!(line.ends_with(&key(id, id as u32).content));
    }
}

#[cfg(unix)]
#[test]
fn test_add_creates_private_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    authorized.add(&[key(1, 1)]).unwrap();

    let mode = fs::metadata(authorized.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[cfg(unix)]
#[test]
fn test_add_tightens_loose_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    fs::write(authorized.path(), "").unwrap();
    fs::set_permissions(authorized.path(), fs::Permissions::from_mode(0o644)).unwrap();

    authorized.add(&[key(1, 1)]).unwrap();

    let mode = fs::metadata(authorized.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn test_remove_drops_only_matching_line() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    let keys = [key(1, 1), key(12, 12), key(2, 2), key(3, 3)];
    authorized.add(&keys).unwrap();
    let before = lines(&authorized);

    assert!(authorized.remove(&keys[0]).unwrap());

    let after = lines(&authorized);
    assert_eq!(after, before[1..].to_vec());
    assert!(after.iter().all(|l| !l.contains("serv key-1 ")));
}

#[test]
fn test_remove_requires_matching_content() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    authorized.add(&[key(1, 1)]).unwrap();

    // Same id, different key material
    assert!(!authorized.remove(&key(1, 99)).unwrap());
    assert_eq!(lines(&authorized).len(), 1);
}

#[test]
fn test_remove_keeps_foreign_lines_and_dangling_tail() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    let target = key(5, 5);
    let content = format!(
        "# managed by hand\n{}ssh-ed25519 AAAAforeign admin@box",
        template().render(&target)
    );
    fs::write(authorized.path(), content).unwrap();

    assert!(authorized.remove(&target).unwrap());

    assert_eq!(
        fs::read_to_string(authorized.path()).unwrap(),
        "# managed by hand\nssh-ed25519 AAAAforeign admin@box\n"
    );
}

#[test]
fn test_remove_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());

    assert!(!authorized.remove(&key(1, 1)).unwrap());
    assert!(!authorized.path().exists());
}

#[test]
fn test_rewrite_all_one_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    let registry = registry_with(5);

    assert_eq!(authorized.rewrite_all(&registry).unwrap(), 5);

    let lines = lines(&authorized);
    assert_eq!(lines.len(), 5);
    for (index, line) in lines.iter().enumerate() {
        let id = index as i64 + 1;
        let expected = template().render(&registry.get_by_id(id).unwrap());
        assert_eq!(format!("{}\n", line), expected);
    }
}

#[test]
fn test_rewrite_all_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    let registry = registry_with(4);

    authorized.rewrite_all(&registry).unwrap();
    let first = fs::read(authorized.path()).unwrap();
    authorized.rewrite_all(&registry).unwrap();
    let second = fs::read(authorized.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_rewrite_all_replaces_stale_content() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    fs::write(authorized.path(), "garbage\ncommand=\"partial").unwrap();

    let registry = registry_with(2);
    authorized.rewrite_all(&registry).unwrap();

    let lines = lines(&authorized);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("command=\"/opt/forge/forge serv key-")));
}

#[test]
fn test_rewrite_all_without_records() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    authorized.add(&[key(1, 1)]).unwrap();

    assert_eq!(authorized.rewrite_all(&MemoryRegistry::new()).unwrap(), 0);
    assert_eq!(fs::read_to_string(authorized.path()).unwrap(), "");
}

#[test]
fn test_rewrite_all_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = AuthorizedKeys::new(dir.path(), template());
    authorized.rewrite_all(&registry_with(3)).unwrap();
    authorized.remove(&key(1, 0)).unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec![AUTHORIZED_KEYS_FILE.to_string()]);
}

#[test]
fn test_concurrent_adds_keep_lines_intact() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = Arc::new(AuthorizedKeys::new(dir.path(), template()));

    let handles: Vec<_> = (1..=32)
        .map(|id| {
            let authorized = authorized.clone();
            std::thread::spawn(move || authorized.add(&[key(id, id as u32)]).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = lines(&authorized);
    assert_eq!(lines.len(), 32);
    for id in 1..=32 {
        let expected = template().render(&key(id, id as u32));
        let matching = lines
            .iter()
            .filter(|l| format!("{}\n", l) == expected)
            .count();
        assert_eq!(matching, 1, "line for key {} missing or corrupted", id);
    }
}

#[test]
fn test_concurrent_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let authorized = Arc::new(AuthorizedKeys::new(dir.path(), template()));
    let doomed: Vec<_> = (1..=8).map(|id| key(id, id as u32)).collect();
    authorized.add(&doomed).unwrap();

    let mut handles = Vec::new();
    for k in doomed {
        let authorized = authorized.clone();
        handles.push(std::thread::spawn(move || {
            assert!(authorized.remove(&k).unwrap());
        }));
    }
    for id in 100..108 {
        let authorized = authorized.clone();
        handles.push(std::thread::spawn(move || {
            authorized.add(&[key(id, id as u32)]).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = lines(&authorized);
    assert_eq!(lines.len(), 8);
    assert!(lines.iter().all(|l| l.contains("serv key-10")));
}
