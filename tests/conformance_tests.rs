// Conformance tests against the kafka-protocol crate
//
// kafka-protocol's generated ApiVersions structs are the reference encoding.
// For every supported version the bytes produced here must match theirs
// exactly, and each side must decode the other's output.

mod helpers;

#[cfg(test)]
mod conformance_tests {
    use bytes::BytesMut;
    use kafka_protocol::messages::api_versions_request::ApiVersionsRequest as KpRequest;
    use kafka_protocol::messages::api_versions_response::{
        ApiVersion as KpApiVersion, ApiVersionsResponse as KpResponse,
    };
    use kafka_protocol::protocol::{Decodable as KpDecodable, Encodable as KpEncodable};
    use kafka_wire::kafka::{
        ApiVersion, ApiVersionsRequest, ApiVersionsResponse, Decodable, Encodable,
    };

    use crate::helpers::init_tracing;

    const KEYS: [(i16, i16, i16); 4] = [(0, 0, 9), (1, 0, 13), (3, 0, 12), (18, 0, 3)];

    // Fields absent at a version must stay at their default on the reference
    // side, which refuses to drop set values
    fn throttle_for(version: i16, throttle_time_ms: i32) -> i32 {
        if version >= 1 {
            throttle_time_ms
        } else {
            0
        }
    }

    fn reference_response(error_code: i16, throttle_time_ms: i32) -> KpResponse {
        let mut response = KpResponse::default();
        response.error_code = error_code;
        response.throttle_time_ms = throttle_time_ms;
        for (api_key, min_version, max_version) in KEYS {
            let mut entry = KpApiVersion::default();
            entry.api_key = api_key;
            entry.min_version = min_version;
            entry.max_version = max_version;
            response.api_keys.push(entry);
        }
        response
    }

    fn our_response(error_code: i16, throttle_time_ms: i32) -> ApiVersionsResponse {
        ApiVersionsResponse {
            error_code,
            throttle_time_ms,
            api_keys: KEYS
                .iter()
                .map(|&(api_key, min_version, max_version)| ApiVersion {
                    api_key,
                    min_version,
                    max_version,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_versions_response_bytes_match() {
        init_tracing();
        for version in 0..=3i16 {
            let throttle = throttle_for(version, 50);
            let mut expected = BytesMut::new();
            KpEncodable::encode(&reference_response(0, throttle), &mut expected, version).unwrap();

            let mut actual = BytesMut::new();
            our_response(0, throttle).encode(&mut actual, version).unwrap();

            assert_eq!(actual, expected, "ApiVersionsResponse v{version}");
        }
    }

    #[test]
    fn test_api_versions_response_cross_decode() {
        for version in 0..=3i16 {
            let throttle = throttle_for(version, 7);
            let mut ours = BytesMut::new();
            our_response(35, throttle).encode(&mut ours, version).unwrap();
            let theirs = <KpResponse as KpDecodable>::decode(&mut ours.freeze(), version).unwrap();
            assert_eq!(theirs.error_code, 35);
            assert_eq!(theirs.api_keys.len(), KEYS.len());
            assert_eq!(theirs.api_keys[3].api_key, 18);
            assert_eq!(theirs.api_keys[3].max_version, 3);

            let mut reference = BytesMut::new();
            KpEncodable::encode(&reference_response(35, throttle), &mut reference, version).unwrap();
            let decoded = ApiVersionsResponse::decode(&mut reference.freeze(), version).unwrap();
            assert_eq!(decoded, our_response(35, throttle), "v{version}");
        }
    }

    #[test]
    fn test_api_versions_response_epoch_tag_matches() {
        let mut reference = reference_response(0, 0);
        reference.finalized_features_epoch = 12;
        let mut expected = BytesMut::new();
        KpEncodable::encode(&reference, &mut expected, 3).unwrap();

        let ours = ApiVersionsResponse {
            finalized_features_epoch: 12,
            ..our_response(0, 0)
        };
        let mut actual = BytesMut::new();
        ours.encode(&mut actual, 3).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_api_versions_request_bytes_match() {
        for version in 0..=3i16 {
            let (name, software_version) = if version >= 3 {
                ("kafka-wire", "0.1.0")
            } else {
                ("", "")
            };
            let mut reference = KpRequest::default();
            reference.client_software_name = name.into();
            reference.client_software_version = software_version.into();
            let mut expected = BytesMut::new();
            KpEncodable::encode(&reference, &mut expected, version).unwrap();

            let request = ApiVersionsRequest {
                client_software_name: name.to_string(),
                client_software_version: software_version.to_string(),
                ..Default::default()
            };
            let mut actual = BytesMut::new();
            request.encode(&mut actual, version).unwrap();
            assert_eq!(actual, expected, "ApiVersionsRequest v{version}");

            let theirs = <KpRequest as KpDecodable>::decode(&mut actual.freeze(), version).unwrap();
            assert_eq!(theirs.client_software_name.as_str(), name);
        }
    }
}
