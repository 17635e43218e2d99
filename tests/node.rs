mod common;

mod tests {
    use embassy_time::Duration;
    use mesh_lighting_node::request::TrySendError;
    use mesh_lighting_node::{
        ButtonInput, ButtonPanel, ButtonTimings, Dimmer, DimmerChannel, DimmerConfig, ElState, EmergencyConfig,
        EmergencyLightingServer, LightingNode, MessageHeader, NodeRequest, Request1Message, RequestQueue,
        StartupStage, Timestamp,
    };

    use crate::common::{EL_HEADER, ELT_HEADER, FakeAnalog, FakePin, RecordingTransport, Sent};

    type Node<'a> = LightingNode<'a, FakeAnalog, FakePin, 8>;

    fn at(millis: u32) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn inputs() -> [ButtonInput; 4] {
        [
            ButtonInput::new(),
            ButtonInput::new(),
            ButtonInput::new(),
            ButtonInput::new(),
        ]
    }

    fn node<'a>(queue: &'a RequestQueue<8>, dimmer: &'a Dimmer, inputs: &'a [ButtonInput; 4]) -> Node<'a> {
        let buttons = ButtonPanel::new(inputs, 1, 2, ButtonTimings::DEFAULT);
        let emergency = EmergencyLightingServer::new(
            EmergencyConfig::DEFAULT,
            FakeAnalog::with_raw(0),
            FakePin::default(),
        );
        LightingNode::new(queue.receiver(), dimmer, buttons, emergency)
    }

    fn enabled_dimmer() -> Dimmer {
        let dimmer = Dimmer::new(DimmerConfig::default());
        dimmer.setup();
        dimmer
    }

    #[test]
    fn test_lightness_requests_apply_in_order() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        let sender = queue.sender();
        for target in [0x1000, 0x2000] {
            let request = NodeRequest::Lightness {
                present: 0,
                target,
                transition: Duration::from_millis(100),
            };
            assert!(sender.try_send(request).is_ok());
        }
        node.poll(at(0), &mut transport);

        assert!(queue.is_empty());
        let transition = dimmer.transition(DimmerChannel::Lightness);
        assert_eq!(transition.target_value(), 0x2000);
        assert_eq!(dimmer.present_value(DimmerChannel::Lightness, at(50)), 0x1000);
    }

    #[test]
    fn test_temperature_and_attention_requests() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        let requests = [
            NodeRequest::Temperature {
                present: 2700,
                target: 6500,
                transition: Duration::from_millis(0),
            },
            NodeRequest::Attention {
                active: true,
                led_on: true,
            },
        ];
        for request in requests {
            assert!(queue.try_send(request).is_ok());
        }
        node.poll(at(0), &mut transport);

        assert_eq!(dimmer.present_value(DimmerChannel::Temperature, at(1)), 6500);
        assert_eq!(dimmer.tick(at(1)).cold, 0xFFFF);
    }

    #[test]
    fn test_startup_sequence_request() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        assert!(queue.try_send(NodeRequest::EnableStartupSequence).is_ok());
        node.poll(at(0), &mut transport);
        assert_eq!(node.startup().stage(), StartupStage::First);
        assert_eq!(dimmer.present_value(DimmerChannel::Lightness, at(0)), 0xB504);

        node.poll(at(3000), &mut transport);
        assert_eq!(node.startup().stage(), StartupStage::Second);
    }

    #[test]
    fn test_startup_request_ignored_while_dimmer_disabled() {
        let queue = RequestQueue::new();
        let dimmer = Dimmer::new(DimmerConfig::default());
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        assert!(queue.try_send(NodeRequest::EnableStartupSequence).is_ok());
        node.poll(at(0), &mut transport);

        dimmer.setup();
        node.poll(at(10), &mut transport);
        assert!(!node.startup().is_running());
    }

    #[test]
    fn test_synchronize_request() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        dimmer.set_instance_index(9);
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        assert!(queue.try_send(NodeRequest::Synchronize).is_ok());
        node.poll(at(0), &mut transport);
        assert_eq!(transport.sent, [Sent::LightnessGet(9)]);
    }

    #[test]
    fn test_emergency_requests_are_routed() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        node.emergency_mut().set_instance_index(4);
        let mut transport = RecordingTransport::new();

        let inhibit = NodeRequest::emergency_lighting(EL_HEADER, &[0x00]);
        let functional = NodeRequest::emergency_lighting_test(ELT_HEADER, &[0x01]);
        for request in [inhibit, functional].into_iter().flatten() {
            assert!(queue.try_send(request).is_ok());
        }
        node.poll(at(0), &mut transport);

        // Functional test refused while inhibited.
        assert_eq!(node.emergency().state(), ElState::Inhibit);
        let states: Vec<_> = transport
            .responses()
            .iter()
            .map(|message| message.payload.as_slice().to_vec())
            .collect();
        assert_eq!(states, [vec![0x0A_u8], vec![0x0A_u8]]);
        assert!(transport.sent.iter().any(|sent| matches!(sent, Sent::Battery(_))));
    }

    #[test]
    fn test_button_press_reaches_transport() {
        let queue = RequestQueue::new();
        let dimmer = enabled_dimmer();
        let inputs = inputs();
        let mut node = node(&queue, &dimmer, &inputs);
        let mut transport = RecordingTransport::new();

        inputs[0].on_edge(true, at(0));
        node.poll(at(0), &mut transport);
        inputs[0].on_edge(false, at(150));
        node.poll(at(150), &mut transport);

        let toggles = transport.toggles();
        assert_eq!(toggles.len(), 1);
        assert_eq!(toggles[0].instance_index, 1);
        assert!(toggles[0].on);
    }

    #[test]
    fn test_request_queue_bounds() {
        let queue: RequestQueue<2> = RequestQueue::new();
        assert!(queue.try_send(NodeRequest::Synchronize).is_ok());
        assert!(queue.try_send(NodeRequest::EnableStartupSequence).is_ok());
        assert_eq!(
            queue.try_send(NodeRequest::Synchronize),
            Err(TrySendError(NodeRequest::Synchronize))
        );
        assert_eq!(queue.len(), 2);

        let receiver = queue.receiver();
        assert_eq!(receiver.try_receive(), Ok(NodeRequest::Synchronize));
        assert_eq!(receiver.try_receive(), Ok(NodeRequest::EnableStartupSequence));
        assert!(receiver.try_receive().is_err());
    }

    #[test]
    fn test_oversized_payloads_are_rejected() {
        let payload = [0u8; 9];
        assert!(NodeRequest::emergency_lighting(EL_HEADER, &payload).is_none());
        assert!(Request1Message::new(EL_HEADER, 0x05, &payload).is_none());
    }

    #[test]
    fn test_request1_opcode_sizes() {
        let header = MessageHeader {
            instance_index: 2,
            instance_subindex: 1,
            opcode: 0x8209,
            opcode_size: 2,
        };
        let message = Request1Message::new(header, 0x00, &[0xAA, 0xBB]);
        let frame = message.map(|message| message.encode());
        assert_eq!(
            frame.as_deref(),
            Some(&[2, 1, 0x82, 0x09, 0x00, 0xAA, 0xBB][..])
        );

        let header = MessageHeader {
            opcode: 0x42,
            opcode_size: 1,
            ..header
        };
        let frame = Request1Message::new(header, 0x07, &[]).map(|message| message.encode());
        assert_eq!(frame.as_deref(), Some(&[2, 1, 0x42, 0x07][..]));
    }
}
