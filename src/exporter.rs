//! Printer address-book export.
//!
//! Produces a `DeviceAddressBook_v5_2` document: one contact item per entry,
//! followed by one e-mail one-touch key per contact.

use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::entry::Entry;
use crate::error::RepoError;
use crate::repository::SqliteRepository;

const ROOT_ELEMENT: &str = "DeviceAddressBook_v5_2";
const INDENT_SIZE: usize = 4;

/// Attributes every contact carries with the same value.
const CONTACT_DEFAULTS: [(&str, &str); 31] = [
    ("SendKeisyou", "0"),
    ("SendCorpName", ""),
    ("SendPostName", ""),
    ("SmbHostName", ""),
    ("SmbPath", ""),
    ("SmbLoginName", ""),
    ("SmbLoginPasswd", ""),
    ("SmbPort", ""),
    ("FtpPath", ""),
    ("FtpHostName", ""),
    ("FtpLoginName", ""),
    ("FtpLoginPasswd", ""),
    ("FtpPort", "21"),
    ("FaxNumber", ""),
    ("FaxSubaddress", ""),
    ("FaxPassword", ""),
    ("FaxCommSpeed", "BPS_33600"),
    ("FaxECM", "On"),
    ("FaxEncryptKeyNumber", "0"),
    ("FaxEncryption", "Off"),
    ("FaxEncryptBoxEnabled", "Off"),
    ("FaxEncryptBoxID", "0000"),
    ("InetFAXAddr", ""),
    ("InetFAXMode", "Simple"),
    ("InetFAXResolution", "3"),
    ("InetFAXFileType", "TIFF_MH"),
    ("IFaxSendModeType", "IFAX"),
    ("InetFAXDataSize", "1"),
    ("InetFAXPaperSize", "1"),
    ("InetFAXResolutionEnum", "Default"),
    ("InetFAXPaperSizeEnum", "Default"),
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("cannot write address book: {0}")]
    Io(#[from] io::Error),
    #[error("cannot write address book: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub display_name: String,
    pub mail_address: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneTouchKey {
    pub id: i64,
    pub address_id: i64,
    pub display_name: String,
    pub address_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressBook {
    pub contacts: Vec<Contact>,
    pub one_touch_keys: Vec<OneTouchKey>,
}

impl AddressBook {
    /// Numbers contacts from 1 in the order given, ignoring storage ids.
    pub fn from_entries(entries: &[Entry]) -> Self {
        let contacts: Vec<Contact> = entries
            .iter()
            .zip(1..)
            .map(|(e, id)| Contact {
                id,
                display_name: e.name.clone(),
                mail_address: e.email.clone(),
            })
            .collect();
        let one_touch_keys = contacts
            .iter()
            .map(|c| OneTouchKey {
                id: c.id,
                address_id: c.id,
                display_name: c.display_name.clone(),
                address_type: "Email".to_string(),
            })
            .collect();
        Self {
            contacts,
            one_touch_keys,
        }
    }

    pub fn write_xml<W: Write>(&self, w: &mut W) -> Result<(), ExportError> {
        let mut writer = Writer::new_with_indent(&mut *w, b' ', INDENT_SIZE);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

        writer.write_event(Event::Comment(BytesText::new("Contact List")))?;
        for c in &self.contacts {
            let id = c.id.to_string();
            writer
                .create_element("Item")
                .with_attributes([
                    ("Id", id.as_str()),
                    ("Type", "Contact"),
                    ("DisplayName", c.display_name.as_str()),
                    ("MailAddress", c.mail_address.as_str()),
                ])
                .with_attributes(CONTACT_DEFAULTS)
                .write_empty()?;
        }

        writer.write_event(Event::Comment(BytesText::new("Email One Touch Keys")))?;
        for k in &self.one_touch_keys {
            let id = k.id.to_string();
            let address_id = k.address_id.to_string();
            writer
                .create_element("Item")
                .with_attributes([
                    ("Id", id.as_str()),
                    ("AddressId", address_id.as_str()),
                    ("Type", "OneTouchKey"),
                    ("AddressType", k.address_type.as_str()),
                    ("DisplayName", k.display_name.as_str()),
                ])
                .write_empty()?;
        }

        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

/// Reads the current table once and writes it as an address book.
/// Returns the number of contacts written.
pub fn export_current_table<W: Write>(repo: &SqliteRepository, w: &mut W) -> Result<usize, ExportError> {
    let entries = repo.all()?;
    let book = AddressBook::from_entries(&entries);
    book.write_xml(w)?;
    log::info!(
        "exported {} contacts from `{}`",
        book.contacts.len(),
        repo.current_table()
    );
    Ok(book.contacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn render(book: &AddressBook) -> String {
        let mut buf = Vec::new();
        book.write_xml(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn contacts_are_renumbered_in_order() {
        let entries = vec![
            Entry::with_id(7, "Jane Doe", "janedoe", "janedoe@email.com").unwrap(),
            Entry::with_id(9, "John Doe", "johndoe", "johndoe@email.com").unwrap(),
        ];
        let book = AddressBook::from_entries(&entries);
        assert_eq!(book.contacts[0].id, 1);
        assert_eq!(book.contacts[1].id, 2);
        assert_eq!(book.contacts[1].display_name, "John Doe");
        assert_eq!(book.one_touch_keys[1].address_id, 2);
        assert_eq!(book.one_touch_keys[1].address_type, "Email");
    }

    #[test]
    fn renders_self_closing_items() {
        let entries = vec![Entry::with_id(1, "Jane Doe", "janedoe", "janedoe@email.com").unwrap()];
        let xml = render(&AddressBook::from_entries(&entries));

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<DeviceAddressBook_v5_2>"));
        assert!(xml.contains(
            r#"<Item Id="1" Type="Contact" DisplayName="Jane Doe" MailAddress="janedoe@email.com" SendKeisyou="0""#
        ));
        assert!(xml.contains(r#"FtpPort="21""#));
        assert!(xml.contains(
            r#"<Item Id="1" AddressId="1" Type="OneTouchKey" AddressType="Email" DisplayName="Jane Doe"/>"#
        ));
        assert!(xml.contains("<!--Email One Touch Keys-->"));
        assert!(!xml.contains("</Item>"));
        assert!(xml.trim_end().ends_with("</DeviceAddressBook_v5_2>"));
    }

    #[test]
    fn empty_book_layout() {
        assert_eq!(
            render(&AddressBook::default()),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <DeviceAddressBook_v5_2>\n\
             \x20   <!--Contact List-->\n\
             \x20   <!--Email One Touch Keys-->\n\
             </DeviceAddressBook_v5_2>\n"
        );
    }

    #[test]
    fn items_are_indented_under_root() {
        let entries = vec![Entry::with_id(3, "Jane Doe", "janedoe", "janedoe@email.com").unwrap()];
        let xml = render(&AddressBook::from_entries(&entries));
        assert!(xml.contains("-->\n    <Item Id=\"1\" Type=\"Contact\""));
        assert!(xml.contains("\"/>\n</DeviceAddressBook_v5_2>\n"));
    }

    #[test]
    fn escapes_attribute_values() {
        let book = AddressBook {
            contacts: vec![Contact {
                id: 1,
                display_name: r#"A "quoted" <name> & co"#.to_string(),
                mail_address: "a@b.com".to_string(),
            }],
            one_touch_keys: vec![],
        };
        let xml = render(&book);
        assert!(xml.contains("DisplayName=\"A &quot;quoted&quot; &lt;name&gt; &amp; co\""));
    }

    #[test]
    fn empty_table_exports_empty_book() {
        let repo = SqliteRepository::open(Connection::open_in_memory().unwrap()).unwrap();
        let mut out = Vec::new();
        assert_eq!(export_current_table(&repo, &mut out).unwrap(), 0);
        let xml = String::from_utf8(out).unwrap();
        assert!(!xml.contains("<Item"));
    }

    #[test]
    fn exports_current_table() {
        let repo = SqliteRepository::open(Connection::open_in_memory().unwrap()).unwrap();
        repo.insert(&Entry::new("Jane Doe", "janedoe", "janedoe@email.com"))
            .unwrap();
        repo.insert(&Entry::new("John Doe", "johndoe", "johndoe@email.com"))
            .unwrap();
        let mut out = Vec::new();
        assert_eq!(export_current_table(&repo, &mut out).unwrap(), 2);
        let xml = String::from_utf8(out).unwrap();
        assert_eq!(xml.matches("Type=\"Contact\"").count(), 2);
        assert_eq!(xml.matches("Type=\"OneTouchKey\"").count(), 2);
    }
}
