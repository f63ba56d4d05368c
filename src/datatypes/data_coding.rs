// ABOUTME: SMPP data_coding scheme with lossless byte conversion and segment sizing
// ABOUTME: Decides how many octets fit in a single or concatenated short message

use std::fmt;

/// Data coding scheme carried in `data_coding` (Section 5.2.19).
///
/// Every byte value round-trips: values without a named variant are kept
/// in `Custom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataCoding {
    /// SMSC Default Alphabet (typically GSM 7-bit)
    #[default]
    SmscDefault,
    /// IA5 (CCITT T.50)/ASCII
    Ia5,
    /// 8-bit binary, 0x02
    Binary,
    /// Latin-1 (ISO-8859-1)
    Latin1,
    /// 8-bit binary, 0x04
    Binary8,
    /// JIS (X 0208-1990)
    Jis,
    /// Cyrillic (ISO-8859-5)
    Cyrillic,
    /// Latin/Hebrew (ISO-8859-8)
    LatinHebrew,
    /// UCS-2 (ISO/IEC-10646)
    Ucs2,
    /// Pictogram encoding
    Pictogram,
    /// ISO-2022-JP (music codes)
    Iso2022Jp,
    /// Extended Kanji JIS (X 0212-1990)
    ExtendedKanji,
    /// KS C 5601
    Ksc5601,
    /// Reserved or vendor value
    Custom(u8),
}

/// Octet budgets for one coding scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentLimits {
    /// Longest message sent as a single short_message.
    pub single: usize,
    /// Per-segment budget once the message must be split.
    pub segment: usize,
}

impl DataCoding {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x00 => DataCoding::SmscDefault,
            0x01 => DataCoding::Ia5,
            0x02 => DataCoding::Binary,
            0x03 => DataCoding::Latin1,
            0x04 => DataCoding::Binary8,
            0x05 => DataCoding::Jis,
            0x06 => DataCoding::Cyrillic,
            0x07 => DataCoding::LatinHebrew,
            0x08 => DataCoding::Ucs2,
            0x09 => DataCoding::Pictogram,
            0x0A => DataCoding::Iso2022Jp,
            0x0D => DataCoding::ExtendedKanji,
            0x0E => DataCoding::Ksc5601,
            other => DataCoding::Custom(other),
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            DataCoding::SmscDefault => 0x00,
            DataCoding::Ia5 => 0x01,
            DataCoding::Binary => 0x02,
            DataCoding::Latin1 => 0x03,
            DataCoding::Binary8 => 0x04,
            DataCoding::Jis => 0x05,
            DataCoding::Cyrillic => 0x06,
            DataCoding::LatinHebrew => 0x07,
            DataCoding::Ucs2 => 0x08,
            DataCoding::Pictogram => 0x09,
            DataCoding::Iso2022Jp => 0x0A,
            DataCoding::ExtendedKanji => 0x0D,
            DataCoding::Ksc5601 => 0x0E,
            DataCoding::Custom(value) => *value,
        }
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self, DataCoding::Ucs2)
    }

    /// Septet-per-octet alphabets where 160 characters fit a single message.
    pub fn is_7bit(&self) -> bool {
        matches!(self, DataCoding::SmscDefault | DataCoding::Ia5)
    }

    /// Octet limits used when deciding whether and how to split a message.
    ///
    /// UCS-2 messages are limited to 140 octets (132 per segment), GSM
    /// default and IA5 to 160 (152 per segment) and everything else to the
    /// 254 octet `short_message` ceiling (132 per segment).
    pub fn limits(&self) -> SegmentLimits {
        if self.is_unicode() {
            SegmentLimits {
                single: 140,
                segment: 132,
            }
        } else if self.is_7bit() {
            SegmentLimits {
                single: 160,
                segment: 152,
            }
        } else {
            SegmentLimits {
                single: 254,
                segment: 132,
            }
        }
    }

    pub fn charset_name(&self) -> &'static str {
        match self {
            DataCoding::SmscDefault => "GSM 7-bit Default",
            DataCoding::Ia5 => "IA5/ASCII",
            DataCoding::Binary | DataCoding::Binary8 => "Binary",
            DataCoding::Latin1 => "ISO-8859-1",
            DataCoding::Jis => "JIS X 0208-1990",
            DataCoding::Cyrillic => "ISO-8859-5",
            DataCoding::LatinHebrew => "ISO-8859-8",
            DataCoding::Ucs2 => "UCS-2",
            DataCoding::Pictogram => "Pictogram",
            DataCoding::Iso2022Jp => "ISO-2022-JP",
            DataCoding::ExtendedKanji => "JIS X 0212-1990",
            DataCoding::Ksc5601 => "KS C 5601",
            DataCoding::Custom(_) => "Custom/Reserved",
        }
    }
}

impl From<u8> for DataCoding {
    fn from(value: u8) -> Self {
        DataCoding::from_byte(value)
    }
}

impl From<DataCoding> for u8 {
    fn from(value: DataCoding) -> Self {
        value.to_byte()
    }
}

impl fmt::Debug for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DataCoding({:#04x} {})", self.to_byte(), self.charset_name())
    }
}

impl fmt::Display for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.charset_name())
    }
}
