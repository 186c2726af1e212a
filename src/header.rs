//! Line header detection for positional input.
//!
//! A positional line is either a primary line (core sections first) or a
//! standalone attachment line that names the row it belongs to by UID.
//! Attachment lines come in two shapes: prefixed by a complete UID
//! attachment (`9815` + UID + flags) or, when the input was produced with
//! leading UIDs, prefixed by the bare six-character UID.

use crate::constants::{
    ATTACHMENT_HEADER_WIDTH, UID_ATTACHMENT_WIDTH, UID_LINE_OFFSET, UID_LINE_PREFIX, UID_WIDTH,
};
use crate::error::{Error, Result};
use tracing::debug;

/// Location of the attachments carried by a standalone attachment line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentHeader {
    pub uid: String,
    /// Byte offset of the first attachment after the UID prefix
    pub payload_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineHeader {
    Primary,
    Attachment(AttachmentHeader),
}

impl LineHeader {
    /// Classify one positional line
    pub fn detect(line: &str, lead_uid: bool) -> Result<Self> {
        let header = if lead_uid {
            Some(read_header(line, 0, UID_WIDTH)?)
        } else if line.starts_with(UID_LINE_PREFIX) {
            Some(read_header(line, UID_LINE_OFFSET, UID_ATTACHMENT_WIDTH)?)
        } else {
            None
        };

        Ok(match header {
            Some(header) => {
                debug!("Attachment line for UID {} at offset {}", header.uid, header.payload_offset);
                LineHeader::Attachment(header)
            }
            None => LineHeader::Primary,
        })
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, LineHeader::Attachment(_))
    }
}

fn read_header(line: &str, uid_offset: usize, payload_offset: usize) -> Result<AttachmentHeader> {
    if line.len() < payload_offset + ATTACHMENT_HEADER_WIDTH {
        return Err(Error::malformed_record(format!(
            "attachment line too short ({} characters): '{}'",
            line.len(),
            line
        )));
    }
    let uid = line
        .get(uid_offset..uid_offset + UID_WIDTH)
        .ok_or_else(|| Error::malformed_record(format!("unreadable UID in line '{}'", line)))?;

    Ok(AttachmentHeader {
        uid: uid.to_string(),
        payload_offset,
    })
}
