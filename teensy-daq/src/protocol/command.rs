//! Command and status vocabulary.

/// Request selected by the first byte of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `F`: firmware string (no checksums either way).
    FirmwareString,
    /// `M`: magic identification bytes.
    Magic,
    /// `I`: board capabilities.
    Capabilities,
    /// `L`: pin list.
    PinList,
    /// `E`: soft reset.
    SoftReset,
    /// `A`: averaged analog read.
    AnalogRead,
    /// `D`: analog write.
    AnalogWrite,
    /// `N`: number of conversions averaged by [`AnalogRead`](Self::AnalogRead).
    SetDcAverage,
    /// `R`: sample period.
    SetSamplePeriod,
    /// `S`: capture storage layout.
    SetStorage,
    /// `Y`: free-running capture.
    AsyncRead,
    /// `G`: triggered capture.
    TriggeredRead,
    /// `P`: step response.
    StepResponse,
    /// `W`: load primary wavetable.
    LoadPrimaryWave,
    /// `w`: load secondary wavetable.
    LoadSecondaryWave,
    /// `V`: wave response on the primary DAC.
    WaveResponse,
    /// `v`: wave response on both DACs.
    DualWaveResponse,
    /// `X`: wave response sampling one selected channel.
    SingleWaveResponse,
    /// `Q`: wave play on the primary DAC.
    WavePlay,
    /// `q`: wave play on both DACs.
    DualWavePlay,
    /// `H`: digital line mode.
    DigitalMode,
    /// `J`: digital write.
    DigitalWrite,
    /// `K`: digital read.
    DigitalRead,
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Ok(match byte {
            b'F' => Command::FirmwareString,
            b'M' => Command::Magic,
            b'I' => Command::Capabilities,
            b'L' => Command::PinList,
            b'E' => Command::SoftReset,
            b'A' => Command::AnalogRead,
            b'D' => Command::AnalogWrite,
            b'N' => Command::SetDcAverage,
            b'R' => Command::SetSamplePeriod,
            b'S' => Command::SetStorage,
            b'Y' => Command::AsyncRead,
            b'G' => Command::TriggeredRead,
            b'P' => Command::StepResponse,
            b'W' => Command::LoadPrimaryWave,
            b'w' => Command::LoadSecondaryWave,
            b'V' => Command::WaveResponse,
            b'v' => Command::DualWaveResponse,
            b'X' => Command::SingleWaveResponse,
            b'Q' => Command::WavePlay,
            b'q' => Command::DualWavePlay,
            b'H' => Command::DigitalMode,
            b'J' => Command::DigitalWrite,
            b'K' => Command::DigitalRead,
            other => return Err(other),
        })
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        match cmd {
            Command::FirmwareString => b'F',
            Command::Magic => b'M',
            Command::Capabilities => b'I',
            Command::PinList => b'L',
            Command::SoftReset => b'E',
            Command::AnalogRead => b'A',
            Command::AnalogWrite => b'D',
            Command::SetDcAverage => b'N',
            Command::SetSamplePeriod => b'R',
            Command::SetStorage => b'S',
            Command::AsyncRead => b'Y',
            Command::TriggeredRead => b'G',
            Command::StepResponse => b'P',
            Command::LoadPrimaryWave => b'W',
            Command::LoadSecondaryWave => b'w',
            Command::WaveResponse => b'V',
            Command::DualWaveResponse => b'v',
            Command::SingleWaveResponse => b'X',
            Command::WavePlay => b'Q',
            Command::DualWavePlay => b'q',
            Command::DigitalMode => b'H',
            Command::DigitalWrite => b'J',
            Command::DigitalRead => b'K',
        }
    }
}

/// Outcome of a run, sent as the first byte after the run's ACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RunStatus {
    /// Run completed normally.
    Ok = 0,
    /// A tick started before the main loop acknowledged the previous one.
    Overrun = 1,
    /// Triggered capture gave up waiting for the trigger.
    Timeout = 2,
    /// Run was cancelled by the halt line.
    Halted = 3,
}

impl RunStatus {
    /// Whether captured data accompanies this status on the wire.
    pub fn has_data(self) -> bool {
        self == RunStatus::Ok
    }
}
