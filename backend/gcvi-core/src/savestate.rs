use crate::vi::{ViState, VideoInterface};
use bincode::config::{Fixint, LittleEndian};
use bincode::error::{DecodeError, EncodeError};
use std::io;
use std::io::{BufReader, BufWriter, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("error saving VI state: {source}")]
    Serialization {
        #[from]
        source: EncodeError,
    },
    #[error("error loading VI state: {source}")]
    Deserialization {
        #[from]
        source: DecodeError,
    },
    #[error("I/O error flushing VI state: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

const BINCODE_CONFIG: bincode::config::Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_little_endian().with_fixed_int_encoding();

impl VideoInterface {
    /// Serialize the register bank and scheduling state. Configuration and the tick rate are
    /// owned by the host and are not included.
    ///
    /// # Errors
    ///
    /// Propagates any error from encoding or from the writer.
    pub fn save_state<W>(&self, writer: W) -> Result<(), SaveStateError>
    where
        W: io::Write,
    {
        let mut writer = BufWriter::new(writer);

        bincode::encode_into_std_write(&self.state, &mut writer, BINCODE_CONFIG)?;
        writer.flush()?;

        Ok(())
    }

    /// Restore state produced by [`Self::save_state`]. On error the VI is left unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any error from decoding or from the reader, including truncated input.
    pub fn load_state<R>(&mut self, reader: R) -> Result<(), SaveStateError>
    where
        R: io::Read,
    {
        let mut reader = BufReader::new(reader);

        let state: ViState = bincode::decode_from_std_read(&mut reader, BINCODE_CONFIG)?;
        self.state = state;

        log::debug!("Loaded VI state at half-line {}", self.half_line_count());

        Ok(())
    }

    /// [`Self::save_state`] into a new buffer
    ///
    /// # Errors
    ///
    /// Propagates any error from encoding.
    pub fn state_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        let bytes = bincode::encode_to_vec(&self.state, BINCODE_CONFIG)?;
        Ok(bytes)
    }
}
