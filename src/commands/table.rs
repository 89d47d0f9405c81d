use std::io::Write;

use anyhow::Result;

use super::{output_message, Session, Status};

pub(super) fn create<W: Write + ?Sized>(session: &mut Session, w: &mut W, name: &str) -> Result<()> {
    session.repo.new_table(name)?;
    let msg = format!("{} was created successfully", session.repo.current_table());
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

pub(super) fn switch<W: Write + ?Sized>(session: &mut Session, w: &mut W, name: &str) -> Result<()> {
    session.repo.switch_table(name)?;
    let msg = format!("switched to {}", session.repo.current_table());
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

pub(super) fn clear<W: Write + ?Sized>(session: &mut Session, w: &mut W) -> Result<()> {
    let removed = session.repo.clear_table()?;
    let msg = format!(
        "{} was cleared successfully ({removed} entries removed)",
        session.repo.current_table()
    );
    output_message(w, Status::Success, &msg)?;
    Ok(())
}

pub(super) fn delete<W: Write + ?Sized>(session: &mut Session, w: &mut W, name: &str) -> Result<()> {
    session.repo.delete_table(name)?;
    output_message(w, Status::Success, &format!("{name} was deleted successfully"))?;
    Ok(())
}

pub(super) fn list<W: Write + ?Sized>(session: &mut Session, w: &mut W) -> Result<()> {
    let tables = session.repo.list_tables()?;
    let current = session.repo.current_table();

    writeln!(w)?;
    writeln!(w, "Tables:")?;
    for t in &tables {
        let marker = if t == current { "*" } else { " " };
        writeln!(w, "   {marker} {t}")?;
    }
    writeln!(w)?;
    Ok(())
}
