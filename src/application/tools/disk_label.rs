//! Filesystem relabel commands and matching fstab entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ToolError, shell_quote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filesystem {
    Ext2,
    Ext3,
    Ext4,
    Xfs,
    Btrfs,
    Vfat,
    Exfat,
    Ntfs,
}

/// How a label's length is measured against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelUnit {
    Bytes,
    Chars,
}

const VFAT_FORBIDDEN: &[char] = &[
    '"', '*', '+', ',', '.', '/', ':', ';', '<', '=', '>', '?', '[', '\\', ']', '|',
];

impl Filesystem {
    pub const ALL: [Filesystem; 8] = [
        Filesystem::Ext2,
        Filesystem::Ext3,
        Filesystem::Ext4,
        Filesystem::Xfs,
        Filesystem::Btrfs,
        Filesystem::Vfat,
        Filesystem::Exfat,
        Filesystem::Ntfs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Filesystem::Ext2 => "ext2",
            Filesystem::Ext3 => "ext3",
            Filesystem::Ext4 => "ext4",
            Filesystem::Xfs => "xfs",
            Filesystem::Btrfs => "btrfs",
            Filesystem::Vfat => "vfat",
            Filesystem::Exfat => "exfat",
            Filesystem::Ntfs => "ntfs",
        }
    }

    pub fn label_limit(self) -> usize {
        match self {
            Filesystem::Ext2 | Filesystem::Ext3 | Filesystem::Ext4 => 16,
            Filesystem::Xfs => 12,
            Filesystem::Btrfs => 255,
            Filesystem::Vfat => 11,
            Filesystem::Exfat => 15,
            Filesystem::Ntfs => 128,
        }
    }

    fn label_unit(self) -> LabelUnit {
        match self {
            Filesystem::Vfat | Filesystem::Exfat | Filesystem::Ntfs => LabelUnit::Chars,
            _ => LabelUnit::Bytes,
        }
    }

    /// fsck pass number for fstab.
    fn fsck_pass(self) -> u8 {
        match self {
            Filesystem::Ext2 | Filesystem::Ext3 | Filesystem::Ext4 => 2,
            _ => 0,
        }
    }

    fn command(self, device: &str, label: &str) -> String {
        let device = shell_quote(device);
        let label = shell_quote(label);
        match self {
            Filesystem::Ext2 | Filesystem::Ext3 | Filesystem::Ext4 => {
                format!("e2label {device} {label}")
            }
            Filesystem::Xfs => format!("xfs_admin -L {label} {device}"),
            Filesystem::Btrfs => format!("btrfs filesystem label {device} {label}"),
            Filesystem::Vfat => format!("fatlabel {device} {label}"),
            Filesystem::Exfat => format!("exfatlabel {device} {label}"),
            Filesystem::Ntfs => format!("ntfslabel {device} {label}"),
        }
    }
}

impl fmt::Display for Filesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filesystem {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ext2" => Ok(Filesystem::Ext2),
            "ext3" => Ok(Filesystem::Ext3),
            "ext4" => Ok(Filesystem::Ext4),
            "xfs" => Ok(Filesystem::Xfs),
            "btrfs" => Ok(Filesystem::Btrfs),
            "vfat" | "fat" | "fat32" => Ok(Filesystem::Vfat),
            "exfat" => Ok(Filesystem::Exfat),
            "ntfs" => Ok(Filesystem::Ntfs),
            other => Err(ToolError::UnsupportedFilesystem(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub device: String,
    pub filesystem: Filesystem,
    pub label: String,
    #[serde(default)]
    pub mount_point: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPlan {
    pub command: String,
    pub fstab_line: Option<String>,
}

pub fn plan(request: &LabelRequest) -> Result<LabelPlan, ToolError> {
    let device = request.device.trim();
    validate_device(device)?;
    let label = request.label.trim();
    validate_label(label, request.filesystem)?;

    let fstab_line = request
        .mount_point
        .as_deref()
        .map(str::trim)
        .filter(|mount| !mount.is_empty())
        .map(|mount| fstab_line(label, mount, request.filesystem))
        .transpose()?;

    Ok(LabelPlan {
        command: request.filesystem.command(device, label),
        fstab_line,
    })
}

fn validate_device(device: &str) -> Result<(), ToolError> {
    match device.strip_prefix("/dev/") {
        Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(ToolError::invalid(
            "device",
            format!("`{device}` is not a /dev/ path"),
        )),
    }
}

fn validate_label(label: &str, filesystem: Filesystem) -> Result<(), ToolError> {
    if label.is_empty() {
        return Err(ToolError::invalid("label", "must not be empty"));
    }
    if label.chars().any(char::is_control) {
        return Err(ToolError::invalid("label", "must not contain control characters"));
    }
    if filesystem == Filesystem::Vfat
        && let Some(ch) = label.chars().find(|ch| VFAT_FORBIDDEN.contains(ch))
    {
        return Err(ToolError::invalid(
            "label",
            format!("`{ch}` is not allowed in vfat labels"),
        ));
    }

    let length = match filesystem.label_unit() {
        LabelUnit::Bytes => label.len(),
        LabelUnit::Chars => label.chars().count(),
    };
    let limit = filesystem.label_limit();
    if length > limit {
        return Err(ToolError::LabelTooLong {
            label: label.to_string(),
            filesystem: filesystem.as_str(),
            length,
            limit,
        });
    }
    Ok(())
}

fn fstab_line(label: &str, mount: &str, filesystem: Filesystem) -> Result<String, ToolError> {
    if !mount.starts_with('/') {
        return Err(ToolError::invalid(
            "mount_point",
            format!("`{mount}` must be an absolute path"),
        ));
    }
    Ok(format!(
        "LABEL={}\t{}\t{}\tdefaults\t0\t{}",
        fstab_escape(label),
        fstab_escape(mount),
        filesystem,
        filesystem.fsck_pass()
    ))
}

/// fstab fields are whitespace separated; spaces become `\040`.
fn fstab_escape(value: &str) -> String {
    value.replace('\\', r"\134").replace(' ', r"\040").replace('\t', r"\011")
}
