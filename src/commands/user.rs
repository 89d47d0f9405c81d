use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::NaiveDate;

use super::{output_message, Session, Status};
use crate::entry::Entry;
use crate::{exporter, importer};

const EXPORT_DATE_FORMAT: &str = "%Y-%b-%d";

pub(super) fn show_all<W: Write + ?Sized>(session: &mut Session, w: &mut W, json: bool) -> Result<()> {
    let all = session.repo.all()?;
    let table = session.repo.current_table();

    if json {
        serde_json::to_writer_pretty(&mut *w, &all)?;
        writeln!(w)?;
        return Ok(());
    }

    if all.is_empty() {
        output_message(w, Status::Notice, &format!("{table} is empty"))?;
        return Ok(());
    }

    output_message(w, Status::Success, &format!("contents of {table}"))?;
    for e in &all {
        e.display(w)?;
        writeln!(w)?;
    }
    Ok(())
}

pub(super) fn show_one<W: Write + ?Sized>(session: &mut Session, w: &mut W, username: &str) -> Result<()> {
    let e = session.repo.get_by_username(username)?;
    e.display(w)?;
    writeln!(w)?;
    Ok(())
}

pub(super) fn add<W: Write + ?Sized>(session: &mut Session, w: &mut W, entry: &Entry) -> Result<()> {
    let stored = session.repo.insert(entry)?;
    let msg = format!("{} was added successfully", stored.name);
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

pub(super) fn update<W: Write + ?Sized>(
    session: &mut Session,
    w: &mut W,
    username: &str,
    entry: &Entry,
) -> Result<()> {
    let stored = session.repo.update(username, entry)?;
    let msg = format!("{} was updated successfully", stored.username);
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

pub(super) fn delete<W: Write + ?Sized>(session: &mut Session, w: &mut W, username: &str) -> Result<()> {
    let e = session.repo.get_by_username(username)?;
    session.repo.delete(username)?;
    output_message(w, Status::Success, &format!("{} was deleted successfully", e.name))?;
    Ok(())
}

pub(super) fn import_csv<W: Write + ?Sized>(session: &mut Session, w: &mut W, path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let added = importer::import_into(&session.repo, file)?;
    let msg = format!("import completed successfully. {added} entries added.");
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

/// `{export_dir}/{table} {YYYY-Mon-DD}.xml`, so exports from different days
/// sit side by side.
fn default_export_path(export_dir: &Path, table: &str, date: NaiveDate) -> PathBuf {
    export_dir.join(format!("{table} {}.xml", date.format(EXPORT_DATE_FORMAT)))
}

pub(super) fn export_xml<W: Write + ?Sized>(
    session: &mut Session,
    w: &mut W,
    path: Option<&Path>,
) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            std::fs::create_dir_all(&session.export_dir).with_context(|| {
                format!("cannot create {}", session.export_dir.display())
            })?;
            let today = chrono::Local::now().date_naive();
            default_export_path(&session.export_dir, session.repo.current_table(), today)
        }
    };

    let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let written = exporter::export_current_table(&session.repo, &mut out)?;
    out.flush()?;

    let msg = format!("{written} contacts exported to {}", path.display());
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::NaiveDate;

    use super::default_export_path;
    use crate::commands::tests::{run, session};
    use crate::commands::Action;
    use crate::error::RepoError;
    use crate::importer::ImportError;
    use crate::Entry;

    fn jane() -> Entry {
        Entry::new("Jane Doe", "janedoe", "janedoe@email.com")
    }

    #[test]
    fn add_show_and_delete() {
        let (mut s, _dir) = session();

        let (res, out) = run(&mut s, Action::AddUser(jane()));
        res.unwrap();
        assert_eq!(out, "[+] Jane Doe was added successfully\n\n");

        let (res, out) = run(&mut s, Action::ShowUsers { json: false });
        res.unwrap();
        assert!(out.starts_with("[+] contents of default_table\n\n"));
        assert!(out.contains("ID: 1\nName: Jane Doe\nUsername: janedoe\nEmail: janedoe@email.com\n"));

        let (res, out) = run(&mut s, Action::DeleteUser("janedoe".into()));
        res.unwrap();
        assert_eq!(out, "[+] Jane Doe was deleted successfully\n\n");

        let (res, out) = run(&mut s, Action::ShowUsers { json: false });
        res.unwrap();
        assert_eq!(out, "[!] default_table is empty\n\n");
    }

    #[test]
    fn show_users_as_json() {
        let (mut s, _dir) = session();
        run(&mut s, Action::AddUser(jane())).0.unwrap();
        let (res, out) = run(&mut s, Action::ShowUsers { json: true });
        res.unwrap();
        let parsed: Vec<Entry> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![Entry { id: 1, ..jane() }]);
    }

    #[test]
    fn duplicate_add_and_missing_delete() {
        let (mut s, _dir) = session();
        run(&mut s, Action::AddUser(jane())).0.unwrap();

        let (res, _) = run(&mut s, Action::AddUser(jane()));
        assert!(matches!(
            res.unwrap_err().downcast_ref::<RepoError>(),
            Some(RepoError::Duplicate)
        ));

        let (res, _) = run(&mut s, Action::DeleteUser("nobody".into()));
        assert_eq!(res.unwrap_err().to_string(), "record does not exist");
    }

    #[test]
    fn update_user() {
        let (mut s, _dir) = session();
        run(&mut s, Action::AddUser(jane())).0.unwrap();
        let (res, out) = run(
            &mut s,
            Action::UpdateUser {
                username: "janedoe".into(),
                entry: Entry::new("Jane Smith", "janesmith", "janesmith@email.com"),
            },
        );
        res.unwrap();
        assert_eq!(out, "[+] janesmith was updated successfully\n\n");
        assert_eq!(s.repo.get_by_username("janesmith").unwrap().id, 1);
    }

    #[test]
    fn import_then_export() {
        let (mut s, dir) = session();
        let csv_path = dir.path().join("people.csv");
        std::fs::write(
            &csv_path,
            "name,username,email\nJane Doe,janedoe,janedoe@email.com\nJohn Doe,johndoe,johndoe@email.com\n",
        )
        .unwrap();

        let (res, out) = run(&mut s, Action::ImportCsv(csv_path.clone()));
        res.unwrap();
        assert_eq!(out, "[+] import completed successfully. 2 entries added.\n\n");

        let (res, _) = run(&mut s, Action::ImportCsv(csv_path));
        let err = res.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::DuplicateRow(2))
        ));

        let (res, out) = run(&mut s, Action::ExportXml(None));
        res.unwrap();
        assert!(out.contains("2 contacts exported to"));
        let exported: Vec<_> = std::fs::read_dir(&s.export_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(exported.len(), 1);
        let file_name = exported[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("default_table "));
        assert!(file_name.ends_with(".xml"));
        let xml = std::fs::read_to_string(&exported[0]).unwrap();
        assert!(xml.contains(r#"DisplayName="John Doe""#));
    }

    #[test]
    fn export_file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            default_export_path(Path::new("books"), "reports", date),
            Path::new("books").join("reports 2024-Jan-02.xml")
        );
    }

    #[test]
    fn exports_from_different_days_do_not_collide() {
        let dir = Path::new("books");
        let first = default_export_path(dir, "default_table", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let second = default_export_path(dir, "default_table", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn explicit_export_path_is_used_as_is() {
        let (mut s, dir) = session();
        let path = dir.path().join("custom.xml");
        let (res, _) = run(&mut s, Action::ExportXml(Some(path.clone())));
        res.unwrap();
        assert!(path.exists());
        assert!(!s.export_dir.exists());
    }

    #[test]
    fn import_missing_file_fails() {
        let (mut s, dir) = session();
        let (res, _) = run(&mut s, Action::ImportCsv(dir.path().join("missing.csv")));
        assert!(res.unwrap_err().to_string().starts_with("cannot open"));
    }
}
