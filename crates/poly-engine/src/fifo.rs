//! Sample FIFO between the engine and a PWM output.
//!
//! The main loop converts samples to duty cycles and pushes them while there
//! is room; the sample-rate interrupt pops one per tick and falls back to the
//! mid-scale duty on underrun.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::synth::Synth;

/// PWM duty for a zero sample (mid-scale of an 8-bit compare register).
pub const PWM_IDLE: u8 = 128;

/// Right shift from a 16-bit sample to a PWM offset.
pub const PWM_SHIFT: u32 = 9;

/// Map a signed sample to an 8-bit PWM duty value.
pub fn pwm_duty(sample: i16) -> u8 {
    (PWM_IDLE as i16 + (sample >> PWM_SHIFT)) as u8
}

/// Bounded queue of PWM duty values. Holds `N - 1` entries.
pub struct SampleFifo<const N: usize> {
    queue: Queue<u8, N>,
}

impl<const N: usize> SampleFifo<N> {
    pub const fn new() -> Self {
        Self { queue: Queue::new() }
    }

    /// Push if there is room; returns whether the value was stored.
    pub fn push(&mut self, duty: u8) -> bool {
        self.queue.enqueue(duty).is_ok()
    }

    /// Pop the oldest value, or [`PWM_IDLE`] when empty.
    pub fn pop_or_idle(&mut self) -> u8 {
        self.queue.dequeue().unwrap_or(PWM_IDLE)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Split into the main-loop writer and the interrupt-side reader.
    pub fn split(&mut self) -> (FifoWriter<'_, N>, FifoReader<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (FifoWriter { producer }, FifoReader { consumer })
    }
}

impl<const N: usize> Default for SampleFifo<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half, owned by the main loop.
pub struct FifoWriter<'a, const N: usize> {
    producer: Producer<'a, u8, N>,
}

impl<const N: usize> FifoWriter<'_, N> {
    pub fn push(&mut self, duty: u8) -> bool {
        self.producer.enqueue(duty).is_ok()
    }

    /// Is there room for another value?
    pub fn ready(&self) -> bool {
        self.producer.ready()
    }

    /// Top the queue up from `synth`; returns how many samples were pushed.
    pub fn fill(&mut self, synth: &mut Synth) -> usize {
        let mut pushed = 0;
        while self.ready() {
            if !self.push(pwm_duty(synth.next_sample())) {
                break;
            }
            pushed += 1;
        }
        pushed
    }
}

/// Consumer half, owned by the sample-rate interrupt.
pub struct FifoReader<'a, const N: usize> {
    consumer: Consumer<'a, u8, N>,
}

impl<const N: usize> FifoReader<'_, N> {
    pub fn pop_or_idle(&mut self) -> u8 {
        self.consumer.dequeue().unwrap_or(PWM_IDLE)
    }
}
