pub mod bucket;

pub use bucket::{bucket, bucket_datetime, buckets_between, millis_to_secs, MILLIS_PER_SECOND};
