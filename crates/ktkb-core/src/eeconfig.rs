/*! Settings persisted across power cycles.

The configuration is stored at the start of the EEPROM as a single
block:

```text
   8 bits     0-64 bytes     16 bits
+----------+--------------+-----------+
|   Len    |   Payload    |    Crc    |
+----------+--------------+-----------+
```

Where `Payload` is the ssmarshal encoding of [`EeConfig`], `Len` its
length in bytes and `Crc` a little endian CRC-16/IBM-SDLC of the
payload. A block whose CRC or magic number doesn't match is considered
corrupted, and the keyboard falls back to the defaults.
*/

use core::fmt::{Debug, Display};

use crc::Table;
use ktkb_common::{dev_info, dev_warn};
use serde::{Deserialize, Serialize};

use crate::rgb::RgbConfig;

const EECONFIG_CRC: crc::Crc<u16, Table<1>> = crc::Crc::<u16, Table<1>>::new(&crc::CRC_16_IBM_SDLC);

pub const EECONFIG_MAGIC: u16 = 0xFEED;
pub const EECONFIG_MAX_PAYLOAD: usize = 64;
/// Bytes taken by the block, including the header and the CRC.
pub const EECONFIG_BLOCK_SIZE: usize = EECONFIG_MAX_PAYLOAD + 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapConfig {
    pub swap_alt_gui: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklightConfig {
    pub level: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub enabled: bool,
    pub music: bool,
    pub music_mode: u8,
    pub midi: bool,
    pub voice: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EeConfig {
    pub magic: u16,
    pub debug: bool,
    pub default_layer: u8,
    pub keymap: KeymapConfig,
    pub backlight: BacklightConfig,
    pub rgb: RgbConfig,
    pub audio: AudioConfig,
    pub terminal: bool,
}

impl EeConfig {
    pub const fn new() -> Self {
        Self {
            magic: EECONFIG_MAGIC,
            debug: false,
            default_layer: 0,
            keymap: KeymapConfig { swap_alt_gui: false },
            backlight: BacklightConfig { level: 0 },
            rgb: RgbConfig::new(),
            audio: AudioConfig { enabled: false, music: false, music_mode: 0, midi: false, voice: 0 },
            terminal: false,
        }
    }
}

impl Default for EeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte addressable non volatile memory.
pub trait Eeprom {
    type Error: Debug;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

/// EEPROM emulated in RAM. Fresh memory reads as `0xFF`, like an erased
/// chip.
#[derive(Clone, Debug)]
pub struct RamEeprom<const N: usize> {
    mem: [u8; N],
    writes: usize,
}

impl<const N: usize> RamEeprom<N> {
    pub const fn new() -> Self {
        Self { mem: [0xFF; N], writes: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mem
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    /// Number of write operations performed so far.
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl<const N: usize> Default for RamEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Eeprom for RamEeprom<N> {
    type Error = OutOfBounds;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let end = offset.checked_add(buf.len()).ok_or(OutOfBounds)?;
        let src = self.mem.get(offset..end).ok_or(OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let end = offset.checked_add(data.len()).ok_or(OutOfBounds)?;
        let dst = self.mem.get_mut(offset..end).ok_or(OutOfBounds)?;
        dst.copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError<E> {
    Storage(E),
    Corrupted,
    Serde(ssmarshal::Error),
    TooLarge,
}

impl<E: Debug> Display for ConfigError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Storage(e) => write!(f, "storage error: {:?}", e),
            ConfigError::Corrupted => write!(f, "config block corrupted"),
            ConfigError::Serde(e) => write!(f, "config encoding error: {:?}", e),
            ConfigError::TooLarge => write!(f, "config does not fit in {} bytes", EECONFIG_MAX_PAYLOAD),
        }
    }
}

fn crc16(buf: &[u8]) -> u16 {
    EECONFIG_CRC.checksum(buf)
}

pub fn read_config<E: Eeprom + ?Sized>(eeprom: &mut E) -> Result<EeConfig, ConfigError<E::Error>> {
    let mut block = [0u8; EECONFIG_BLOCK_SIZE];
    eeprom.read(0, &mut block).map_err(ConfigError::Storage)?;

    let len = block[0] as usize;
    if len == 0 || len > EECONFIG_MAX_PAYLOAD {
        return Err(ConfigError::Corrupted);
    }

    let payload = &block[1..1 + len];
    let stored_crc = u16::from_le_bytes([block[1 + len], block[2 + len]]);
    if stored_crc != crc16(payload) {
        dev_warn!("Config CRC mismatch: stored {:x}, computed {:x}", stored_crc, crc16(payload));
        return Err(ConfigError::Corrupted);
    }

    let (config, _) = ssmarshal::deserialize::<EeConfig>(payload).map_err(ConfigError::Serde)?;
    if config.magic != EECONFIG_MAGIC {
        return Err(ConfigError::Corrupted);
    }

    Ok(config)
}

pub fn write_config<E: Eeprom + ?Sized>(eeprom: &mut E, config: &EeConfig) -> Result<(), ConfigError<E::Error>> {
    let mut block = [0u8; EECONFIG_BLOCK_SIZE];
    let len = match ssmarshal::serialize(&mut block[1..1 + EECONFIG_MAX_PAYLOAD], config) {
        Ok(len) => len,
        Err(ssmarshal::Error::EndOfStream) => return Err(ConfigError::TooLarge),
        Err(e) => return Err(ConfigError::Serde(e)),
    };

    block[0] = len as u8;
    let crc = crc16(&block[1..1 + len]).to_le_bytes();
    block[1 + len..3 + len].copy_from_slice(&crc);

    eeprom.write(0, &block[..3 + len]).map_err(ConfigError::Storage)
}

/// Writes the default configuration and returns it.
pub fn reset_config<E: Eeprom + ?Sized>(eeprom: &mut E) -> Result<EeConfig, ConfigError<E::Error>> {
    dev_info!("Resetting persisted config");
    let config = EeConfig::new();
    write_config(eeprom, &config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_blank_eeprom_is_corrupted() {
        let mut ee = RamEeprom::<128>::new();
        assert!(matches!(read_config(&mut ee), Err(ConfigError::Corrupted)));
    }

    #[test]
    fn test_write_then_read() {
        let mut ee = RamEeprom::<128>::new();
        let mut config = EeConfig::new();
        config.default_layer = 3;
        config.keymap.swap_alt_gui = true;
        config.rgb.hue = 42;
        config.audio.music_mode = 2;

        write_config(&mut ee, &config).unwrap();
        assert_eq!(read_config(&mut ee).unwrap(), config);
        assert_eq!(ee.writes(), 1);
    }

    #[test]
    fn test_flipped_bit_is_detected() {
        let mut ee = RamEeprom::<128>::new();
        write_config(&mut ee, &EeConfig::new()).unwrap();
        ee.as_bytes_mut()[4] ^= 0x10;
        assert!(matches!(read_config(&mut ee), Err(ConfigError::Corrupted)));
    }

    #[test]
    fn test_wrong_magic_is_corrupted() {
        let mut ee = RamEeprom::<128>::new();
        let config = EeConfig { magic: 0x1234, ..EeConfig::new() };
        write_config(&mut ee, &config).unwrap();
        assert!(matches!(read_config(&mut ee), Err(ConfigError::Corrupted)));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut ee = RamEeprom::<128>::new();
        let config = EeConfig { debug: true, terminal: true, ..EeConfig::new() };
        write_config(&mut ee, &config).unwrap();
        assert_eq!(reset_config(&mut ee).unwrap(), EeConfig::new());
        assert_eq!(read_config(&mut ee).unwrap(), EeConfig::new());
    }

    #[test]
    fn test_small_eeprom_fails_with_storage_error() {
        let mut ee = RamEeprom::<8>::new();
        assert!(matches!(write_config(&mut ee, &EeConfig::new()), Err(ConfigError::Storage(OutOfBounds))));
    }
}
