use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info};

use crate::codec::payload::{self, PayloadError};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::detector::dtmf::ToneClassifier;
use crate::detector::Symbol;
use crate::error::{Error, Result};
use crate::framer::MessageFramer;
use crate::generator;
use crate::source::{AudioSource, SampleBuffer, SourceError};

/// Starts the decoder: classify -> debounce -> frame -> verify, one thread
/// per stage, joined by rendezvous channels. Returns the verified payloads.
///
/// Stages exit when their upstream ends or their downstream is dropped, so
/// an exhausted source eventually disconnects the returned receiver.
pub fn spawn<S>(source: S, config: &Config) -> Result<Receiver<Vec<u8>>>
where
    S: AudioSource + Send + 'static,
{
    config.validate()?;

    let sample_rate = source.sample_rate();
    let classifier = ToneClassifier::new(sample_rate, &config.detector)?;
    info!(sample_rate, block_length = classifier.block_length(), "starting decoder");

    let (raw_sender, raw_receiver) = bounded(0);

    thread::Builder::new()
        .name("classify".to_string())
        .spawn(move || {
            match classify(source, classifier, raw_sender) {
                Ok(()) => debug!("done: classify"),
                Err(SourceError::Exhausted) => info!("end of audio stream"),
                Err(e) => error!(error = %e, "audio source failed"),
            }
        })?;

    spawn_decoder(raw_receiver, config)
}

/// The stages after the classifier, fed with raw per-block symbols.
pub fn spawn_decoder(raw: Receiver<Symbol>, config: &Config) -> Result<Receiver<Vec<u8>>> {
    config.validate()?;

    let debounced = chain("debounce", raw, {
        let mut debouncer = Debouncer::new(&config.debounce);
        move |code| {
            let confirmed = debouncer.feed(code);
            debug!(raw = %code, confirmed = ?confirmed.map(|s| s.to_string()), "debounce");
            confirmed
        }
    })?;

    let messages = chain("frame", debounced, {
        let mut framer = MessageFramer::new(&config.framer);
        move |symbol| {
            debug!(symbol = %symbol, "frame");
            framer.feed(symbol)
        }
    })?;

    chain("verify", messages, verify)
}

/// Runs until the first verified payload, or `None` if the audio ends first.
pub fn decode_first<S>(source: S, config: &Config) -> Result<Option<Vec<u8>>>
where
    S: AudioSource + Send + 'static,
{
    let payloads = spawn(source, config)?;
    Ok(payloads.recv().ok())
}

/// Renders `message` as tones and decodes it back in memory. Returns the
/// rendered keys when the same payload comes back.
pub fn loopback(message: &[u8], config: &Config) -> Result<String> {
    let keys = payload::encode(message);
    let samples = generator::render(&keys, &config.generator)?;
    let source = SampleBuffer::new(config.generator.sample_rate, samples);

    let decoded = decode_first(source, config)?;
    if decoded.as_deref() == Some(message) {
        Ok(keys)
    } else {
        Err(Error::LoopbackMismatch { keys, expected: message.to_vec(), decoded })
    }
}

fn classify<S: AudioSource>(mut source: S, mut classifier: ToneClassifier, sender: Sender<Symbol>) -> std::result::Result<(), SourceError> {
    let block_length = classifier.block_length();

    loop {
        let samples = match source.read(block_length) {
            Ok(samples) => samples,
            Err(e) if e.is_transient() => {
                error!(error = %e, "skipping block");
                continue;
            },
            Err(e) => return Err(e),
        };

        let symbol = classifier.classify(&samples);
        if sender.send(symbol).is_err() {
            return Ok(());
        }
    }
}

fn verify(message: String) -> Option<Vec<u8>> {
    info!(%message, "got message");

    match payload::decode(&message) {
        Ok(payload) => {
            info!(?payload, "checksum verified");
            Some(payload)
        },
        Err(e @ PayloadError::Checksum { .. }) => {
            info!(error = %e, "dropping message");
            None
        },
        Err(e) => {
            error!(error = %e, "dropping message");
            None
        },
    }
}

/// Runs `stage` on its own thread over everything from `input`, forwarding
/// whatever it produces.
fn chain<I, O, F>(name: &str, input: Receiver<I>, mut stage: F) -> Result<Receiver<O>>
where
    I: Send + 'static,
    O: Send + 'static,
    F: FnMut(I) -> Option<O> + Send + 'static,
{
    let (sender, receiver) = bounded(0);

    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            for item in input.iter() {
                if let Some(output) = stage(item) {
                    if sender.send(output).is_err() {
                        break;
                    }
                }
            }
            debug!("done: {}", thread::current().name().unwrap_or("stage"));
        })?;

    Ok(receiver)
}
