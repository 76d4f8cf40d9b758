//! Web Audio output: one context, one master gain, one oscillator + gain per tone.

use crate::audio::{AudioOut, GainStep, Tone};
use crate::error::AudioError;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorType};

pub struct WebAudio {
    context: Option<AudioContext>,
    master: Option<GainNode>,
    volume: f32,
}

impl WebAudio {
    /// Nothing is created until [`AudioOut::unlock`] runs inside a user gesture.
    pub fn new(volume: f64) -> Self {
        Self {
            context: None,
            master: None,
            volume: volume as f32,
        }
    }
}

fn node_error(err: JsValue) -> AudioError {
    AudioError::Node(format!("{:?}", err))
}

impl AudioOut for WebAudio {
    fn unlock(&mut self) -> Result<(), AudioError> {
        if self.context.is_none() {
            let context = AudioContext::new().map_err(node_error)?;
            let master = context.create_gain().map_err(node_error)?;
            master.gain().set_value(self.volume);
            master
                .connect_with_audio_node(&context.destination())
                .map_err(node_error)?;
            self.context = Some(context);
            self.master = Some(master);
        }
        if let Some(context) = &self.context {
            if context.state() == AudioContextState::Suspended {
                let _ = context.resume().map_err(node_error)?;
            }
        }
        Ok(())
    }

    fn current_time(&self) -> Option<f64> {
        self.context
            .as_ref()
            .filter(|c| c.state() != AudioContextState::Closed)
            .map(|c| c.current_time())
    }

    fn play_tone(&mut self, tone: &Tone) -> Result<(), AudioError> {
        let (Some(context), Some(master)) = (&self.context, &self.master) else {
            return Err(AudioError::Unavailable);
        };
        let osc = context.create_oscillator().map_err(node_error)?;
        osc.set_type(OscillatorType::Sine);
        osc.frequency()
            .set_value_at_time(tone.frequency as f32, tone.start)
            .map_err(node_error)?;

        let gain = context.create_gain().map_err(node_error)?;
        let param = gain.gain();
        for step in tone.gain_steps() {
            match step {
                GainStep::Set { value, at } => param.set_value_at_time(value, at),
                GainStep::Ramp { value, at } => param.linear_ramp_to_value_at_time(value, at),
            }
            .map_err(node_error)?;
        }

        osc.connect_with_audio_node(&gain).map_err(node_error)?;
        gain.connect_with_audio_node(master).map_err(node_error)?;
        osc.start_with_when(tone.start).map_err(node_error)?;
        osc.stop_with_when(tone.end()).map_err(node_error)?;
        Ok(())
    }
}
