// DDS transport - ROS 2 image topics over a pure-Rust DDS participant
//
// ROS 2 maps a topic "/name" onto the DDS topic "rt/name" and names the
// message type "<package>::msg::dds_::<Type>_". Readers use the default QoS,
// whose best-effort reliability matches both reliable and best-effort
// publishers.

use super::{Header, RawImage, Stamp, SubscriptionHandle, Transport, TransportError};
use dust_dds::domain::domain_participant::DomainParticipant;
use dust_dds::domain::domain_participant_factory::DomainParticipantFactory;
use dust_dds::infrastructure::error::DdsError;
use dust_dds::infrastructure::qos::QosKind;
use dust_dds::infrastructure::status::NO_STATUS;
use dust_dds::subscription::data_reader::DataReader;
use dust_dds::subscription::sample_info::{ANY_INSTANCE_STATE, ANY_SAMPLE_STATE, ANY_VIEW_STATE};
use dust_dds::subscription::subscriber::Subscriber;
use dust_dds::topic_definition::topic::Topic;
use dust_dds::topic_definition::type_support::DdsType;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// DDS type name of `sensor_msgs/Image`
pub const IMAGE_TYPE_NAME: &str = "sensor_msgs::msg::dds_::Image_";

/// Prefix ROS 2 puts in front of topic names on the wire
const ROS_TOPIC_PREFIX: &str = "rt/";

/// Upper bound on samples taken per pump
const MAX_SAMPLES_PER_TAKE: i32 = 32;

/// Sleep between polls while waiting for the first sample
const POLL_INTERVAL: Duration = Duration::from_micros(250);

#[derive(Debug, Clone, DdsType)]
struct TimeMsg {
    sec: i32,
    nanosec: u32,
}

#[derive(Debug, Clone, DdsType)]
struct HeaderMsg {
    stamp: TimeMsg,
    frame_id: String,
}

#[derive(Debug, Clone, DdsType)]
struct ImageMsg {
    header: HeaderMsg,
    height: u32,
    width: u32,
    encoding: String,
    is_bigendian: u8,
    step: u32,
    data: Vec<u8>,
}

impl From<ImageMsg> for RawImage {
    fn from(msg: ImageMsg) -> Self {
        RawImage {
            header: Header {
                stamp: Stamp {
                    sec: msg.header.stamp.sec,
                    nanosec: msg.header.stamp.nanosec,
                },
                frame_id: msg.header.frame_id,
            },
            height: msg.height,
            width: msg.width,
            encoding: msg.encoding,
            is_bigendian: msg.is_bigendian,
            step: msg.step,
            data: msg.data,
        }
    }
}

/// Map a ROS 2 topic name onto its DDS topic name
///
/// `/cones` and `cones` both become `rt/cones`.
pub fn ros_topic_name(topic: &str) -> String {
    format!("{}{}", ROS_TOPIC_PREFIX, topic.trim_start_matches('/'))
}

fn dds_error(err: DdsError) -> TransportError {
    TransportError::Dds(format!("{:?}", err))
}

struct ReaderEntry {
    topic: Topic,
    reader: DataReader<ImageMsg>,
}

/// DDS-backed middleware runtime
pub struct DdsTransport {
    participant: Option<DomainParticipant>,
    subscriber: Option<Subscriber>,
    readers: HashMap<u64, ReaderEntry>,
    next_id: u64,
}

impl DdsTransport {
    /// Join a DDS domain
    ///
    /// # Arguments
    /// * `domain_id` - DDS domain, the same number as `ROS_DOMAIN_ID`
    pub fn new(domain_id: i32) -> Result<Self, TransportError> {
        let factory = DomainParticipantFactory::get_instance();
        let participant = factory
            .create_participant(domain_id, QosKind::Default, None, NO_STATUS)
            .map_err(dds_error)?;
        let subscriber = participant
            .create_subscriber(QosKind::Default, None, NO_STATUS)
            .map_err(dds_error)?;

        log::info!("Joined DDS domain {}", domain_id);

        Ok(Self {
            participant: Some(participant),
            subscriber: Some(subscriber),
            readers: HashMap::new(),
            next_id: 1,
        })
    }

    fn take_pending(reader: &DataReader<ImageMsg>) -> Result<Vec<RawImage>, TransportError> {
        let samples = match reader.take(
            MAX_SAMPLES_PER_TAKE,
            ANY_SAMPLE_STATE,
            ANY_VIEW_STATE,
            ANY_INSTANCE_STATE,
        ) {
            Ok(samples) => samples,
            Err(DdsError::NoData) => return Ok(Vec::new()),
            Err(err) => return Err(dds_error(err)),
        };

        let mut messages = Vec::with_capacity(samples.len());
        for sample in samples {
            // Samples without data are instance-state notifications
            if let Ok(msg) = sample.data() {
                messages.push(RawImage::from(msg));
            }
        }
        Ok(messages)
    }
}

impl Transport for DdsTransport {
    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle, TransportError> {
        let participant = self.participant.as_ref().ok_or(TransportError::Shutdown)?;
        let subscriber = self.subscriber.as_ref().ok_or(TransportError::Shutdown)?;

        let dds_topic = participant
            .create_topic::<ImageMsg>(
                &ros_topic_name(topic),
                IMAGE_TYPE_NAME,
                QosKind::Default,
                None,
                NO_STATUS,
            )
            .map_err(dds_error)?;
        let reader = subscriber
            .create_datareader::<ImageMsg>(&dds_topic, QosKind::Default, None, NO_STATUS)
            .map_err(dds_error)?;

        let id = self.next_id;
        self.next_id += 1;
        self.readers.insert(
            id,
            ReaderEntry {
                topic: dds_topic,
                reader,
            },
        );

        log::debug!("Created reader for DDS topic '{}'", ros_topic_name(topic));
        Ok(SubscriptionHandle::new(id, topic))
    }

    fn take(
        &mut self,
        handle: &SubscriptionHandle,
        timeout: Duration,
    ) -> Result<Vec<RawImage>, TransportError> {
        if self.participant.is_none() {
            return Err(TransportError::Shutdown);
        }
        let entry = self
            .readers
            .get(&handle.id())
            .ok_or(TransportError::UnknownSubscription(handle.id()))?;

        let deadline = Instant::now() + timeout;
        loop {
            let messages = Self::take_pending(&entry.reader)?;
            if !messages.is_empty() || Instant::now() >= deadline {
                return Ok(messages);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - Instant::now()));
        }
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), TransportError> {
        let participant = self.participant.as_ref().ok_or(TransportError::Shutdown)?;
        let subscriber = self.subscriber.as_ref().ok_or(TransportError::Shutdown)?;
        let entry = self
            .readers
            .remove(&handle.id())
            .ok_or(TransportError::UnknownSubscription(handle.id()))?;

        subscriber
            .delete_datareader(&entry.reader)
            .map_err(dds_error)?;
        participant.delete_topic(&entry.topic).map_err(dds_error)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        let Some(participant) = self.participant.take() else {
            return Ok(());
        };
        self.subscriber = None;
        self.readers.clear();

        participant
            .delete_contained_entities()
            .map_err(dds_error)?;
        DomainParticipantFactory::get_instance()
            .delete_participant(&participant)
            .map_err(dds_error)?;

        log::info!("DDS participant deleted");
        Ok(())
    }
}

impl Drop for DdsTransport {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Failed to delete DDS participant: {}", e);
        }
    }
}
