/// Serial port debug channel.
///
/// Only the transfer trigger is modelled: when SC is written with bit 7
/// (start) and bit 0 (internal clock) set, the byte in SB is captured into
/// `output` and the transfer is reported as already complete.
#[derive(Default)]
pub(super) struct Serial {
    pub(super) output: Vec<u8>,
}

impl Serial {
    /// Handle a write to SC and return the value SC should hold afterwards.
    pub(super) fn write_control(&mut self, value: u8, data: u8) -> u8 {
        if (value & 0x81) != 0x81 {
            return value;
        }

        log::debug!(
            "serial: 0x{data:02X} {:?}",
            char::from(data).escape_default().to_string()
        );
        self.output.push(data);
        if data == b'\n' {
            let line_start = self.output[..self.output.len() - 1]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |idx| idx + 1);
            log::info!(
                "serial: {}",
                String::from_utf8_lossy(&self.output[line_start..self.output.len() - 1])
            );
        }

        value & !0x80
    }
}
