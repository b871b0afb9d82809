// Model exports
pub mod domain;
pub mod external;
pub mod requests;
pub mod responses;

pub use domain::{
    Amenity, Catalog, Category, Coordinates, Feedback, Gym, GymAmenity, GymAmenityDetail,
    GymCategory, GymDetails, GymPatch, GymStatus, MapMarker, MarkerPopup, Message, Review,
    ReviewStatus, Role, Route, RouteStep, TravelMode, User,
};
pub use external::{LatLng, OpeningHours, PlaceGeometry, PlacePhoto, PlaceRecord};
pub use requests::{
    DirectionsQuery, FilterGymsRequest, ReviewStatusRequest, SearchGymsRequest, SessionQuery,
    SubmitFeedbackRequest, SubmitReviewRequest, ToggleFilterRequest, UpdateRoleRequest,
    VerificationRequest,
};
pub use responses::{
    CreatedResponse, ErrorResponse, GymListResponse, HealthResponse, MarkersResponse,
    SearchErrorResponse,
};
